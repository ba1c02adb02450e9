use super::{Context, print_json, render};
use crate::domain::notice::Notice;
use crate::domain::teacher::{
    NewTeacher, Qualification, ROLES, SUBJECTS, TeacherPatch, TeacherStatus,
};
use crate::error::{Result, StaffPayError};
use crate::interfaces::csv::teacher_reader::TeacherReader;
use clap::builder::PossibleValuesParser;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Subcommand, Debug)]
pub enum TeacherCommand {
    /// List teachers, optionally filtered by a search term.
    List {
        /// Matches name, subject, email or role, case-insensitively.
        #[arg(long, short)]
        search: Option<String>,
        /// Only show active teachers.
        #[arg(long)]
        active: bool,
    },
    /// Add a teacher through the add-teacher form.
    Add(AddTeacherArgs),
    /// Change fields of an existing teacher.
    Update(UpdateTeacherArgs),
    /// Remove a teacher.
    Delete { id: String },
    /// Add every teacher listed in a CSV file.
    Import { path: PathBuf },
}

#[derive(Args, Debug)]
pub struct AddTeacherArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, value_parser = PossibleValuesParser::new(SUBJECTS))]
    pub subject: String,
    #[arg(long, value_parser = PossibleValuesParser::new(ROLES))]
    pub role: String,
    /// Birth date, e.g. 1990-04-21.
    #[arg(long)]
    pub birthdate: String,
    #[arg(long)]
    pub address: String,
    /// Monthly salary.
    #[arg(long)]
    pub salary: Decimal,
    /// Years of experience.
    #[arg(long, default_value_t = 0)]
    pub experience: u32,
    #[arg(long, default_value = "active")]
    pub status: TeacherStatus,
    #[arg(long, default_value = "")]
    pub phone: String,
    /// Rating between 0 and 5; unset or 0 means the default of 4.0.
    #[arg(long)]
    pub rating: Option<f64>,
    /// A qualification as `NAME:RATE`, rate 1-5. Repeat for several.
    #[arg(long = "qualification", value_parser = parse_qualification)]
    pub qualifications: Vec<Qualification>,
}

impl From<AddTeacherArgs> for NewTeacher {
    fn from(args: AddTeacherArgs) -> Self {
        NewTeacher {
            name: args.name,
            email: args.email,
            subject: args.subject,
            experience: args.experience,
            salary: args.salary,
            status: args.status,
            phone: args.phone,
            rating: args.rating,
            role: args.role,
            birthdate: args.birthdate,
            address: args.address,
            qualifications: args.qualifications,
        }
    }
}

#[derive(Args, Debug)]
pub struct UpdateTeacherArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, value_parser = PossibleValuesParser::new(SUBJECTS))]
    pub subject: Option<String>,
    #[arg(long)]
    pub experience: Option<u32>,
    #[arg(long)]
    pub salary: Option<Decimal>,
    #[arg(long)]
    pub status: Option<TeacherStatus>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub rating: Option<f64>,
    #[arg(long, value_parser = PossibleValuesParser::new(ROLES))]
    pub role: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

impl UpdateTeacherArgs {
    fn into_parts(self) -> (String, TeacherPatch) {
        let patch = TeacherPatch {
            name: self.name,
            email: self.email,
            subject: self.subject,
            experience: self.experience,
            salary: self.salary,
            status: self.status,
            phone: self.phone,
            rating: self.rating,
            role: self.role,
            address: self.address,
        };
        (self.id, patch)
    }
}

fn parse_qualification(raw: &str) -> std::result::Result<Qualification, String> {
    let (name, rate) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:RATE, got '{raw}'"))?;
    let rate = rate
        .trim()
        .parse::<u8>()
        .map_err(|_| format!("invalid rate '{rate}'"))?;
    Ok(Qualification {
        name: name.trim().to_string(),
        rate,
    })
}

pub async fn run<W: Write>(cmd: TeacherCommand, ctx: &mut Context, out: &mut W) -> Result<()> {
    match cmd {
        TeacherCommand::List { search, active } => {
            let term = search.unwrap_or_default();
            let teachers: Vec<_> = ctx
                .roster
                .search(&term)
                .into_iter()
                .filter(|t| !active || t.is_active())
                .collect();
            if ctx.json {
                print_json(out, &teachers)
            } else {
                render::teachers(out, &teachers)?;
                Ok(())
            }
        }
        TeacherCommand::Add(args) => {
            let teacher = ctx.roster.add(args.into()).await?;
            render::notice(&Notice::success("Teacher added successfully!"));
            if ctx.json {
                print_json(out, &teacher)
            } else {
                writeln!(out, "{}", teacher.id)?;
                Ok(())
            }
        }
        TeacherCommand::Update(args) => {
            let (id, patch) = args.into_parts();
            if patch.is_empty() {
                return Err(StaffPayError::ValidationError(
                    "Nothing to update".to_string(),
                ));
            }
            let teacher = ctx.roster.update(&id, patch).await?;
            render::notice(&Notice::success("Teacher updated successfully!"));
            if ctx.json {
                print_json(out, &teacher)
            } else {
                render::teachers(out, &[&teacher])?;
                Ok(())
            }
        }
        TeacherCommand::Delete { id } => {
            let removed = ctx.roster.delete(&id).await?;
            render::notice(
                &Notice::success("Teacher deleted successfully!").with_description(removed.name),
            );
            Ok(())
        }
        TeacherCommand::Import { path } => import(&path, ctx, out).await,
    }
}

/// Submits every row through the add-teacher form. Rows that fail the form
/// rules are reported and skipped; a storage failure stops the import.
async fn import<W: Write>(path: &Path, ctx: &mut Context, out: &mut W) -> Result<()> {
    let file = File::open(path)?;
    let mut added = 0usize;
    let mut rejected = 0usize;
    for (index, row) in TeacherReader::new(file).teachers().enumerate() {
        let line = index + 2;
        let result = match row {
            Ok(form) => ctx.roster.add(form).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(teacher) => {
                added += 1;
                writeln!(out, "{}", teacher.id)?;
            }
            Err(e) if e.is_validation() || matches!(e, StaffPayError::CsvError(_)) => {
                rejected += 1;
                warn!(line, error = %e, "skipping teacher row");
                render::notice(
                    &Notice::error(format!("Line {line} skipped")).with_description(e.to_string()),
                );
            }
            Err(e) => return Err(e),
        }
    }

    let summary = format!("{added} added, {rejected} skipped");
    if added == 0 && rejected > 0 {
        return Err(StaffPayError::ValidationError(format!(
            "No teachers imported ({summary})"
        )));
    }
    render::notice(&Notice::success("Import finished").with_description(summary));
    Ok(())
}
