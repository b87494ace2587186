use crate::error::CertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIN_NAME_CHARS: usize = 3;

/// Proficiency tier printed on the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::A1, Level::A2, Level::B1, Level::B2, Level::C1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CertError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == raw)
            .ok_or_else(|| {
                CertError::InvalidInput(format!(
                    "level: expected one of A1, A2, B1, B2, C1, got {raw:?}"
                ))
            })
    }
}

/// A `YYYY-MM-DD` date kept as its textual components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsoDate {
    year: String,
    month: String,
    day: String,
}

impl IsoDate {
    pub fn parse(raw: &str) -> Result<Self, CertError> {
        let invalid = || CertError::InvalidInput(format!("date: expected YYYY-MM-DD, got {raw:?}"));
        let mut parts = raw.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(year, 4) || !digits(month, 2) || !digits(day, 2) {
            return Err(invalid());
        }
        Ok(Self {
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        })
    }

    /// Day-first rendering, `16/02/2026` for `2026-02-16`.
    pub fn day_month_year(&self) -> String {
        format!("{}/{}/{}", self.day, self.month, self.year)
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

impl FromStr for IsoDate {
    type Err = CertError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        IsoDate::parse(raw)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    student_name: String,
    level: String,
    date: String,
}

/// Validated input for one certificate build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest", into = "WireRequest")]
pub struct CertificateRequest {
    student_name: String,
    level: Level,
    date: IsoDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    student_name: String,
    level: Level,
    date: String,
}

impl CertificateRequest {
    pub fn new(student_name: &str, level: &str, date: &str) -> Result<Self, CertError> {
        if student_name.trim().chars().count() < MIN_NAME_CHARS {
            return Err(CertError::InvalidInput(format!(
                "studentName: must contain at least {MIN_NAME_CHARS} characters"
            )));
        }
        Ok(Self {
            student_name: student_name.to_string(),
            level: level.parse()?,
            date: date.parse()?,
        })
    }

    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn date(&self) -> &IsoDate {
        &self.date
    }
}

impl TryFrom<RawRequest> for CertificateRequest {
    type Error = CertError;

    fn try_from(raw: RawRequest) -> Result<Self, Self::Error> {
        CertificateRequest::new(&raw.student_name, &raw.level, &raw.date)
    }
}

impl From<CertificateRequest> for WireRequest {
    fn from(req: CertificateRequest) -> Self {
        WireRequest {
            student_name: req.student_name,
            level: req.level,
            date: req.date.to_string(),
        }
    }
}
