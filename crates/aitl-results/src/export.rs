//! CSV export of logged ticks.

use crate::types::TickRecord;

pub const CSV_HEADER: &str =
    "step,time_s,reference,measurement,plant_output,control,disturbance,state_code,state,kp,ki,kd";

/// Render ticks as CSV with a header row.
pub fn ticks_to_csv(records: &[TickRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for r in records {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}\n",
            r.step,
            r.time_s,
            r.reference,
            r.measurement,
            r.plant_output,
            r.control,
            r.disturbance,
            r.state_code,
            r.state,
            r.kp,
            r.ki,
            r.kd
        ));
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_tick() {
        let record = TickRecord {
            step: 3,
            time_s: 0.03,
            reference: 1.0,
            measurement: 0.5,
            plant_output: 0.51,
            control: 1.2,
            disturbance: 0.0,
            state_code: 2,
            state: "TUNE".to_string(),
            kp: 1.0,
            ki: 0.2,
            kd: 0.01,
        };
        let csv = ticks_to_csv(&[record.clone(), record]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "3,0.03,1,0.5,0.51,1.2,0,2,TUNE,1,0.2,0.01");
    }
}
