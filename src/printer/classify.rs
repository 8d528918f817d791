use super::snapshot::PrintState;

/// Current and target heater readings used to tell "Heating" from "Printing".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Temperatures {
    pub nozzle: f64,
    pub nozzle_target: f64,
    pub bed: f64,
    pub bed_target: f64,
}

impl Temperatures {
    /// Both heaters within `tolerance` of their targets; the boundary counts as heated.
    pub fn is_heated(&self, tolerance: f64) -> bool {
        (self.nozzle - self.nozzle_target).abs() <= tolerance
            && (self.bed - self.bed_target).abs() <= tolerance
    }
}

const PRINT_STATS_LABELS: [(&str, PrintState); 4] = [
    ("standby", PrintState::Standby),
    ("paused", PrintState::Paused),
    ("error", PrintState::Error),
    ("complete", PrintState::Complete),
];

/// Map raw `webhooks.state` / `print_stats.state` to a presentable state.
///
/// Klipper reports `printing` as soon as a job starts, including while the
/// heaters are still ramping, so the split between `Heating` and `Printing`
/// comes from the temperature deltas.
pub fn classify(
    webhooks_state: &str,
    print_stats_state: &str,
    temps: Temperatures,
    tolerance: f64,
) -> PrintState {
    if webhooks_state == "shutdown" {
        return PrintState::PrinterOff;
    }
    if webhooks_state != "ready" {
        return PrintState::Passthrough(webhooks_state.to_string());
    }

    if let Some((_, label)) = PRINT_STATS_LABELS
        .iter()
        .find(|(raw, _)| *raw == print_stats_state)
    {
        return label.clone();
    }

    if print_stats_state == "printing" {
        return if temps.is_heated(tolerance) {
            PrintState::Printing
        } else {
            PrintState::Heating
        };
    }

    PrintState::Passthrough(print_stats_state.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 2.0;

    fn temps(nozzle: f64, nozzle_target: f64, bed: f64, bed_target: f64) -> Temperatures {
        Temperatures {
            nozzle,
            nozzle_target,
            bed,
            bed_target,
        }
    }

    #[test]
    fn shutdown_wins_regardless_of_job_state() {
        for job in ["printing", "paused", "bizarre", ""] {
            assert_eq!(
                classify("shutdown", job, temps(10.0, 250.0, 5.0, 90.0), TOL),
                PrintState::PrinterOff
            );
        }
    }

    #[test]
    fn non_ready_webhooks_pass_through() {
        assert_eq!(
            classify("startup", "printing", temps(0.0, 0.0, 0.0, 0.0), TOL),
            PrintState::Passthrough("startup".into())
        );
        assert_eq!(
            classify("unknown", "unknown", Temperatures::default(), TOL),
            PrintState::Passthrough("unknown".into())
        );
    }

    #[test]
    fn lookup_table_labels() {
        let t = Temperatures::default();
        assert_eq!(classify("ready", "standby", t, TOL), PrintState::Standby);
        assert_eq!(classify("ready", "paused", t, TOL), PrintState::Paused);
        assert_eq!(classify("ready", "error", t, TOL), PrintState::Error);
        assert_eq!(classify("ready", "complete", t, TOL), PrintState::Complete);
    }

    #[test]
    fn printing_at_target_is_printing() {
        assert_eq!(
            classify("ready", "printing", temps(200.0, 200.0, 60.0, 60.0), TOL),
            PrintState::Printing
        );
    }

    #[test]
    fn printing_below_target_is_heating() {
        assert_eq!(
            classify("ready", "printing", temps(190.0, 200.0, 60.0, 60.0), TOL),
            PrintState::Heating
        );
        assert_eq!(
            classify("ready", "printing", temps(200.0, 200.0, 40.0, 60.0), TOL),
            PrintState::Heating
        );
    }

    #[test]
    fn tolerance_boundary_counts_as_heated() {
        assert_eq!(
            classify("ready", "printing", temps(198.0, 200.0, 62.0, 60.0), TOL),
            PrintState::Printing
        );
        assert_eq!(
            classify("ready", "printing", temps(197.5, 200.0, 60.0, 60.0), TOL),
            PrintState::Heating
        );
    }

    #[test]
    fn unknown_job_state_passes_through() {
        assert_eq!(
            classify("ready", "bizarre", Temperatures::default(), TOL),
            PrintState::Passthrough("bizarre".into())
        );
    }

    #[test]
    fn classify_is_deterministic() {
        let t = temps(199.0, 200.0, 59.0, 60.0);
        let first = classify("ready", "printing", t, TOL);
        for _ in 0..10 {
            assert_eq!(classify("ready", "printing", t, TOL), first);
        }
    }
}
