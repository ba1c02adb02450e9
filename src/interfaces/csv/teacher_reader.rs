use crate::domain::teacher::{NewTeacher, Qualification, TeacherStatus};
use crate::error::{Result, StaffPayError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One line of a teacher import file. A single qualification per line.
#[derive(Debug, Deserialize)]
struct TeacherRow {
    name: String,
    email: String,
    subject: String,
    experience: Option<u32>,
    salary: Decimal,
    status: Option<TeacherStatus>,
    #[serde(default)]
    phone: String,
    rating: Option<f64>,
    role: String,
    birthdate: String,
    address: String,
    qualification: String,
    qualification_rate: Option<u8>,
}

impl From<TeacherRow> for NewTeacher {
    fn from(row: TeacherRow) -> Self {
        NewTeacher {
            name: row.name,
            email: row.email,
            subject: row.subject,
            experience: row.experience.unwrap_or_default(),
            salary: row.salary,
            status: row.status.unwrap_or_default(),
            phone: row.phone,
            rating: row.rating,
            role: row.role,
            birthdate: row.birthdate,
            address: row.address,
            qualifications: vec![Qualification {
                name: row.qualification,
                // an unrated qualification fails the form's 1-5 check
                rate: row.qualification_rate.unwrap_or(0),
            }],
        }
    }
}

/// Reads add-teacher forms from a CSV source.
///
/// Rows are only parsed here; the form rules are applied when each one is
/// submitted to the roster.
pub struct TeacherReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TeacherReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn teachers(self) -> impl Iterator<Item = Result<NewTeacher>> {
        self.reader
            .into_deserialize::<TeacherRow>()
            .map(|result| result.map(NewTeacher::from).map_err(StaffPayError::from))
    }
}
