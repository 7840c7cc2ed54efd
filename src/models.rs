use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Raw record from the appointments CSV
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CsvRecord {
    pub dataconsulta: String,
    pub unidade: String,
    pub tipoconsulta: String,
    pub valor: f64,
    pub retornodaconsulta: Option<f64>,
}

/// One appointment row, normalized for filtering and aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub date: NaiveDate,
    pub unit: String,
    pub specialty: String,
    pub amount: f64,
    pub return_days: Option<f64>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a date cell, dropping any time-of-day part.
pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date());
        }
    }
    bail!("unrecognized date: {:?}", raw)
}

impl CsvRecord {
    pub fn to_appointment(&self) -> anyhow::Result<Appointment> {
        let date = parse_date(&self.dataconsulta)
            .with_context(|| format!("bad dataconsulta for unit {}", self.unidade))?;
        if !self.valor.is_finite() {
            bail!("bad valor {} for unit {}", self.valor, self.unidade);
        }

        Ok(Appointment {
            date,
            unit: self.unidade.trim().to_string(),
            specialty: self.tipoconsulta.trim().to_string(),
            amount: self.valor,
            // NaN cells count as missing, like an empty cell
            return_days: self.retornodaconsulta.filter(|v| !v.is_nan()),
        })
    }
}

impl From<&Appointment> for CsvRecord {
    fn from(a: &Appointment) -> Self {
        Self {
            dataconsulta: a.date.format("%Y-%m-%d").to_string(),
            unidade: a.unit.clone(),
            tipoconsulta: a.specialty.clone(),
            valor: a.amount,
            retornodaconsulta: a.return_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("2024-03-05").unwrap(), expected);
        assert_eq!(parse_date("2024-03-05 14:30:00").unwrap(), expected);
        assert_eq!(parse_date("2024-03-05T08:00:00").unwrap(), expected);
        assert_eq!(parse_date("05/03/2024").unwrap(), expected);
        assert!(parse_date("March 5th").is_err());
    }

    #[test]
    fn test_to_appointment_trims_labels() {
        let record = CsvRecord {
            dataconsulta: "2024-01-02".to_string(),
            unidade: " Centro ".to_string(),
            tipoconsulta: "Cardiologia".to_string(),
            valor: -15.5,
            retornodaconsulta: None,
        };
        let appt = record.to_appointment().unwrap();
        assert_eq!(appt.unit, "Centro");
        assert_eq!(appt.amount, -15.5);
        assert_eq!(appt.return_days, None);
    }

    #[test]
    fn test_non_finite_amount_is_rejected() {
        for valor in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let record = CsvRecord {
                dataconsulta: "2024-01-02".to_string(),
                unidade: "Centro".to_string(),
                tipoconsulta: "Cardiologia".to_string(),
                valor,
                retornodaconsulta: Some(f64::NAN),
            };
            assert!(record.to_appointment().is_err());
        }
    }
}
