use std::fmt;

use serde::Serialize;

use super::{Result, RosterError};

/// Number of comma separated fields in one line of the backing file.
const FIELD_COUNT: usize = 5;

/// Letter grade derived from a student's marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Classifies marks top-down, first matching band wins.
    pub fn from_marks(marks: f64) -> Self {
        if marks >= 90.0 {
            Grade::A
        } else if marks >= 75.0 {
            Grade::B
        } else if marks >= 60.0 {
            Grade::C
        } else {
            Grade::D
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Grade::A => 'A',
            Grade::B => 'B',
            Grade::C => 'C',
            Grade::D => 'D',
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single student held in the roster.
///
/// Fields are private so a record can only be built through the validating
/// constructors, which keeps `grade` in step with `marks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    roll_number: i32,
    name: String,
    email: String,
    course: String,
    marks: f64,
    grade: Grade,
}

impl StudentRecord {
    /// Builds a record from already-typed values, validating every field.
    pub fn new(
        roll_number: i32,
        name: &str,
        email: &str,
        course: &str,
        marks: f64,
    ) -> Result<Self> {
        let name = text_field("name", name)?;
        let email = text_field("email", email)?;
        let course = text_field("course", course)?;
        let marks = check_marks(marks)?;
        Ok(Self::assemble(roll_number, name, email, course, marks))
    }

    /// Builds a record from raw text, as typed by a user or read from the
    /// backing file. Fields are checked in order and the first failure wins.
    pub fn parse(
        roll_number: &str,
        name: &str,
        email: &str,
        course: &str,
        marks: &str,
    ) -> Result<Self> {
        let roll_number = roll_number
            .trim()
            .parse::<i32>()
            .map_err(|e| RosterError::invalid("roll number", e.to_string()))?;
        let name = text_field("name", name)?;
        let email = text_field("email", email)?;
        let course = text_field("course", course)?;
        let marks = marks
            .trim()
            .parse::<f64>()
            .map_err(|e| RosterError::invalid("marks", e.to_string()))?;
        let marks = check_marks(marks)?;
        Ok(Self::assemble(roll_number, name, email, course, marks))
    }

    fn assemble(roll_number: i32, name: String, email: String, course: String, marks: f64) -> Self {
        Self {
            roll_number,
            name,
            email,
            course,
            marks,
            grade: Grade::from_marks(marks),
        }
    }

    /// Returns the same record stored under a different roll number.
    pub fn with_roll_number(mut self, roll_number: i32) -> Self {
        self.roll_number = roll_number;
        self
    }

    pub fn roll_number(&self) -> i32 {
        self.roll_number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn marks(&self) -> f64 {
        self.marks
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Case-insensitive comparison against the student's name.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Encodes the record as one line of the backing file, without the
    /// trailing newline. The grade is not written.
    ///
    /// Marks use `Debug` formatting so whole numbers keep their decimal point
    /// (`95.0`), and every value parses back to the same `f64`.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{:?}",
            self.roll_number, self.name, self.email, self.course, self.marks
        )
    }

    /// Decodes one line of the backing file. The line must split on `,` into
    /// exactly five fields, which then go through the same validation as
    /// interactive input.
    pub fn from_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != FIELD_COUNT {
            return Err(RosterError::invalid(
                "line",
                format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
            ));
        }
        Self::parse(fields[0], fields[1], fields[2], fields[3], fields[4])
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Roll No: {}", self.roll_number)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Email: {}", self.email)?;
        writeln!(f, "Course: {}", self.course)?;
        writeln!(f, "Marks: {:?}", self.marks)?;
        writeln!(f, "Grade: {}", self.grade)?;
        write!(f, "-------------------------")
    }
}

// Commas are rejected because the file format has no escaping.
fn text_field(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RosterError::invalid(field, "must not be empty"));
    }
    if value.contains(',') {
        return Err(RosterError::invalid(field, "must not contain a comma"));
    }
    Ok(value.to_string())
}

fn check_marks(marks: f64) -> Result<f64> {
    if (0.0..=100.0).contains(&marks) {
        Ok(marks)
    } else {
        Err(RosterError::invalid("marks", "must be between 0 and 100"))
    }
}
