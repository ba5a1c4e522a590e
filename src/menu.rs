//! Interactive menu over a shared roster.
//!
//! The loop reads from any `BufRead` and writes to any `Write` so sessions can
//! be scripted in tests. Reaching end of input leaves the menu without saving.

use std::io::{self, BufRead, Write};

use tracing::{debug, error};

use crate::{RosterError, StudentRecord, ThreadSafeRoster};

const MENU: &str = "
===== Student Roster Menu =====
1. Add Student
2. View All Students
3. Search by Name
4. Delete by Name
5. Sort by Marks (desc)
6. Update Student by Roll No
7. Save and Exit
Enter choice: ";

/// What the loop should do after handling one choice.
enum Flow {
    Continue,
    Exit,
}

/// Runs the menu until the user saves and exits or input runs out.
pub fn run<R: BufRead, W: Write>(
    roster: &ThreadSafeRoster,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    loop {
        let Some(choice) = prompt(&mut input, &mut output, MENU)? else {
            debug!("input closed, leaving menu without saving");
            return Ok(());
        };
        let flow = match choice.parse::<u32>() {
            Ok(1) => add_student(roster, &mut input, &mut output)?,
            Ok(2) => show_all(roster, &mut output)?,
            Ok(3) => search_by_name(roster, &mut input, &mut output)?,
            Ok(4) => delete_by_name(roster, &mut input, &mut output)?,
            Ok(5) => show_sorted(roster, &mut output)?,
            Ok(6) => update_student(roster, &mut input, &mut output)?,
            Ok(7) => save_and_exit(roster, &mut output)?,
            Ok(_) => {
                writeln!(output, "Invalid choice.")?;
                Flow::Continue
            }
            Err(_) => {
                writeln!(output, "Enter number")?;
                Flow::Continue
            }
        };
        if let Flow::Exit = flow {
            return Ok(());
        }
    }
}

/// Prints the roster as a JSON array ordered by roll number.
pub fn write_json<W: Write>(roster: &ThreadSafeRoster, mut output: W) -> crate::Result<()> {
    let mut records = roster.list_all()?;
    records.sort_by_key(StudentRecord::roll_number);
    serde_json::to_writer_pretty(&mut output, &records).map_err(io::Error::from)?;
    writeln!(output)?;
    Ok(())
}

/// Maps each error kind to the message shown to the user.
pub fn describe(err: &RosterError) -> String {
    match err {
        RosterError::InvalidInput { .. } => format!("Input error: {}", err),
        RosterError::DuplicateKey(roll) => format!("Duplicate roll no: {}", roll),
        RosterError::NotFound(what) => format!("Student not found: {}", what),
        RosterError::Io(e) => format!("File error: {}", e),
        RosterError::LockPoisoned => format!("Internal error: {}", err),
    }
}

// Returns `None` once input is exhausted.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", label)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Reads the five raw fields of a record and validates them. `Ok(None)` means
/// input ended part way through.
fn read_record<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<crate::Result<StudentRecord>>> {
    let labels = [
        "Enter Roll No: ",
        "Enter Name: ",
        "Enter Email: ",
        "Enter Course: ",
        "Enter Marks: ",
    ];
    let mut fields = Vec::with_capacity(labels.len());
    for label in labels {
        match prompt(input, output, label)? {
            Some(field) => fields.push(field),
            None => return Ok(None),
        }
    }
    Ok(Some(StudentRecord::parse(&fields[0], &fields[1], &fields[2], &fields[3], &fields[4])))
}

fn report<W: Write>(output: &mut W, err: &RosterError) -> io::Result<Flow> {
    writeln!(output, "{}", describe(err))?;
    Ok(Flow::Continue)
}

fn show_records<W: Write>(output: &mut W, records: &[StudentRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(output, "No records.");
    }
    for record in records {
        writeln!(output, "{}", record)?;
    }
    Ok(())
}

fn add_student<R: BufRead, W: Write>(
    roster: &ThreadSafeRoster,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(record) = read_record(input, output)? else {
        return Ok(Flow::Exit);
    };
    match record.and_then(|record| roster.add(record)) {
        Ok(()) => {
            writeln!(output, "Added.")?;
            Ok(Flow::Continue)
        }
        Err(e) => report(output, &e),
    }
}

fn show_all<W: Write>(roster: &ThreadSafeRoster, output: &mut W) -> io::Result<Flow> {
    match roster.list_all() {
        Ok(records) => {
            show_records(output, &records)?;
            Ok(Flow::Continue)
        }
        Err(e) => report(output, &e),
    }
}

fn show_sorted<W: Write>(roster: &ThreadSafeRoster, output: &mut W) -> io::Result<Flow> {
    match roster.list_by_marks_desc() {
        Ok(records) => {
            if !records.is_empty() {
                writeln!(output, "Sorted Student List by Marks:")?;
            }
            show_records(output, &records)?;
            Ok(Flow::Continue)
        }
        Err(e) => report(output, &e),
    }
}

fn search_by_name<R: BufRead, W: Write>(
    roster: &ThreadSafeRoster,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(name) = prompt(input, output, "Enter name to search: ")? else {
        return Ok(Flow::Exit);
    };
    match roster.find_by_name(&name) {
        Ok(record) => {
            writeln!(output, "Student Info:")?;
            writeln!(output, "{}", record)?;
            Ok(Flow::Continue)
        }
        Err(e) => report(output, &e),
    }
}

fn delete_by_name<R: BufRead, W: Write>(
    roster: &ThreadSafeRoster,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(name) = prompt(input, output, "Enter name to delete: ")? else {
        return Ok(Flow::Exit);
    };
    match roster.delete_by_name(&name) {
        Ok(_) => {
            writeln!(output, "Student record deleted.")?;
            Ok(Flow::Continue)
        }
        Err(e) => report(output, &e),
    }
}

fn update_student<R: BufRead, W: Write>(
    roster: &ThreadSafeRoster,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    let Some(raw_roll) = prompt(input, output, "Enter roll no to update: ")? else {
        return Ok(Flow::Exit);
    };
    let Ok(roll_number) = raw_roll.parse::<i32>() else {
        writeln!(output, "Invalid roll no.")?;
        return Ok(Flow::Continue);
    };
    let existing = match roster.find_by_roll(roll_number) {
        Ok(existing) => existing,
        Err(e) => return report(output, &e),
    };
    writeln!(output, "Existing record:")?;
    writeln!(output, "{}", existing)?;
    writeln!(output, "Enter new details:")?;

    let Some(record) = read_record(input, output)? else {
        return Ok(Flow::Exit);
    };
    match record.and_then(|record| roster.update(roll_number, record)) {
        Ok(()) => {
            writeln!(output, "Updated.")?;
            Ok(Flow::Continue)
        }
        Err(e) => report(output, &e),
    }
}

fn save_and_exit<W: Write>(roster: &ThreadSafeRoster, output: &mut W) -> io::Result<Flow> {
    match roster.save() {
        Ok(()) => writeln!(output, "Saved and exiting.")?,
        Err(e) => {
            error!(error = %e, "failed to save roster");
            writeln!(output, "Error saving: {}", describe(&e))?;
        }
    }
    Ok(Flow::Exit)
}

#[cfg(test)]
mod test {
    use std::{fs, io::Cursor};

    use tempfile::tempdir;

    use super::*;

    fn session(roster: &ThreadSafeRoster, script: &str) -> String {
        let mut output = Vec::new();
        run(roster, Cursor::new(script.to_string()), &mut output).expect("menu session failed");
        String::from_utf8(output).expect("menu output is utf-8")
    }

    fn seeded_roster() -> ThreadSafeRoster {
        let roster = ThreadSafeRoster::new("unused.txt");
        roster
            .add(StudentRecord::new(1, "Alice", "alice@uni.edu", "CS", 95.0).unwrap())
            .unwrap();
        roster
            .add(StudentRecord::new(2, "Bob", "bob@uni.edu", "Maths", 64.0).unwrap())
            .unwrap();
        roster
    }

    #[test]
    fn test_add_then_view() {
        let roster = ThreadSafeRoster::new("unused.txt");
        let out = session(&roster, "1\n7\nCarol\ncarol@uni.edu\nArt\n81\n2\n");
        assert!(out.contains("Added."));
        assert!(out.contains("Name: Carol"));
        assert!(out.contains("Grade: B"));
        assert_eq!(roster.len().unwrap(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_and_duplicate() {
        let roster = seeded_roster();
        let out = session(&roster, "1\n3\nDan\nd@uni.edu\nCS\n-5\n1\n1\nDup\nx@y\nCS\n50\n");
        assert!(out.contains("Input error: invalid marks"));
        assert!(out.contains("Duplicate roll no: 1"));
        assert_eq!(roster.len().unwrap(), 2);
    }

    #[test]
    fn test_search_and_delete() {
        let roster = seeded_roster();
        let out = session(&roster, "3\nalice\n4\nALICE\n4\nalice\n");
        assert!(out.contains("Student Info:\nRoll No: 1"));
        assert!(out.contains("Student record deleted."));
        assert!(out.contains("Student not found: name alice"));
        assert_eq!(roster.len().unwrap(), 1);
    }

    #[test]
    fn test_sorted_view_orders_by_marks() {
        let roster = seeded_roster();
        let out = session(&roster, "5\n");
        let alice = out.find("Name: Alice").expect("Alice is listed");
        let bob = out.find("Name: Bob").expect("Bob is listed");
        assert!(alice < bob);
    }

    #[test]
    fn test_update_flow() {
        let roster = seeded_roster();
        let out = session(&roster, "6\n2\n2\nRobert\nbob@uni.edu\nMaths\n77\n6\nabc\n6\n9\n");
        assert!(out.contains("Existing record:\nRoll No: 2"));
        assert!(out.contains("Updated."));
        assert!(out.contains("Invalid roll no."));
        assert!(out.contains("Student not found: roll number 9"));
        let updated = roster.find_by_roll(2).unwrap();
        assert_eq!(updated.name(), "Robert");
        assert_eq!(updated.grade().as_char(), 'B');
    }

    #[test]
    fn test_bad_choices_keep_running() {
        let roster = ThreadSafeRoster::new("unused.txt");
        let out = session(&roster, "x\n42\n2\n");
        assert!(out.contains("Enter number"));
        assert!(out.contains("Invalid choice."));
        assert!(out.contains("No records."));
    }

    #[test]
    fn test_save_and_exit_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.txt");
        let roster = ThreadSafeRoster::new(&path);
        let out = session(&roster, "1\n1\nAlice\na@b\nCS\n95\n7\n2\n");
        assert!(out.contains("Saved and exiting."));
        // Nothing after the exit choice is processed.
        assert!(!out.contains("Roll No: 1"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "1,Alice,a@b,CS,95.0\n");
    }

    #[test]
    fn test_end_of_input_does_not_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("students.txt");
        let roster = ThreadSafeRoster::new(&path);
        session(&roster, "1\n1\nAlice\n");
        assert!(!path.exists());
    }

    #[test]
    fn test_write_json_orders_by_roll() {
        let roster = seeded_roster();
        let mut output = Vec::new();
        write_json(&roster, &mut output).expect("json export failed");
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let records = value.as_array().expect("export is an array");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["roll_number"], 1);
        assert_eq!(records[0]["grade"], "A");
        assert_eq!(records[1]["name"], "Bob");
    }
}
