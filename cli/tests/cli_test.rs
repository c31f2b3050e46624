//! Tests for the `outliner` binary.

use std::path::Path;
use std::process::Command;

/// Two-page PDF with a title, two chapters and a subsection.
fn report_pdf() -> Vec<u8> {
    let pages: [&[(&str, f32, f32, &str)]; 2] = [
        &[
            ("F2", 24.0, 720.0, "Overview"),
            ("F2", 18.0, 680.0, "1. Background"),
            ("F1", 11.0, 650.0, "the project started as a small study of regional data"),
            ("F1", 11.0, 636.0, "the project started as a small study of regional data"),
        ],
        &[
            ("F2", 18.0, 720.0, "2. Method"),
            ("F1", 11.0, 690.0, "we describe how samples were collected and processed"),
            ("F2", 14.0, 620.0, "2.1 Data"),
            ("F1", 11.0, 590.0, "records were cleaned and merged before the analysis"),
        ],
    ];

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [5 0 R 7 0 R] /Count 2 >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>".to_string(),
    ];
    for (i, lines) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            6 + i * 2
        ));
        let mut stream = String::new();
        for (font, size, y, text) in lines.iter() {
            stream.push_str(&format!(
                "BT /{} {} Tf 1 0 0 1 72 {} Tm ({}) Tj ET\n",
                font, size, y, text
            ));
        }
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.into_bytes()
}

fn outliner(args: &[&Path]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_outliner"))
        .arg("outline")
        .args(args)
        .env_remove("OUTLINER_LANG")
        .env_remove("OUTLINER_LANGUAGES")
        .output()
        .unwrap()
}

#[test]
fn test_outline_writes_one_file_per_pdf() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("a.pdf"), report_pdf()).unwrap();
    std::fs::write(input.path().join("b.pdf"), report_pdf()).unwrap();
    std::fs::write(input.path().join("c.pdf"), b"%PDF-1.4\nnothing else").unwrap();

    let out = outliner(&[input.path(), output.path()]);
    assert!(out.status.success());

    let json = std::fs::read_to_string(output.path().join("a.json")).unwrap();
    assert!(json.contains("\"title\": \"Overview\""));
    assert!(json.contains("2.1 Data"));
    assert!(output.path().join("b.json").is_file());
    assert!(!output.path().join("c.json").exists());
}

#[test]
fn test_unwritable_outline_leaves_siblings() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::write(input.path().join("a.pdf"), report_pdf()).unwrap();
    std::fs::write(input.path().join("b.pdf"), report_pdf()).unwrap();
    std::fs::create_dir(output.path().join("a.json")).unwrap();

    let out = outliner(&[input.path(), output.path()]);
    assert!(out.status.success());
    assert!(output.path().join("a.json").is_dir());
    assert!(output.path().join("b.json").is_file());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 written"));
}

#[test]
fn test_missing_input_dir_fails() {
    let output = tempfile::tempdir().unwrap();
    let missing = output.path().join("missing");

    let out = outliner(&[&missing, output.path()]);
    assert_eq!(out.status.code(), Some(1));
}
