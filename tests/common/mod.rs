#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const HEADER: &str =
    "caller_id,recipient,call_date,end_time,duration,cost,reference,currency,type";

/// Write a CDR export with the standard header followed by `lines`.
pub fn write_cdr_file(dir: &Path, filename: &str, lines: &[&str]) {
    let mut content = String::from(HEADER);
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(dir.join(filename), content).expect("failed to write fixture");
}

/// The two-call export used throughout the end-to-end tests.
pub fn setup_basic_directory() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    write_cdr_file(
        dir.path(),
        "calls.csv",
        &[
            "A1,B1,01/01/2024,10:00:00,60,1.50,REF1,USD,Local",
            "A1,B1,02/01/2024,10:05:00,120,3.00,REF2,USD,International",
        ],
    );
    dir
}

/// Several files, duplicate references, ties on cost and a few bad lines.
pub fn setup_mixed_directory() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    write_cdr_file(
        dir.path(),
        "2024_01_a.csv",
        &[
            "441215598896,448000096481,01/01/2024,09:00:00,30,0.50,C001,GBP,1",
            "441215598896,442036000000,03/01/2024,10:00:00,45,2.25,C002,GBP,2",
            "447700900123,441215598896,03/01/2024,11:30:00,600,12.00,C003,GBP,2",
            "",
            "broken,line,only",
        ],
    );
    write_cdr_file(
        dir.path(),
        "2024_01_b.csv",
        &[
            "441215598896,448000096481,05/01/2024,14:00:00,90,2.25,C004,GBP,1",
            "441215598896,448000096481,31/01/2024,23:59:59,15,0.10,C001,GBP,Domestic",
            "441215598896,448000096481,bad-date,12:00:00,20,9.99,C005,GBP,1",
            "447700900123,441215598896,06/01/2024,08:00:00,oops,1.00,C006,EUR,mystery",
        ],
    );
    fs::write(dir.path().join("readme.txt"), "not a cdr file").expect("failed to write fixture");
    dir
}
