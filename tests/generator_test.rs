mod common;

use chrono::NaiveDate;
use common::*;
use letter_merge::utils::currency::CurrencyFormat;
use letter_merge::{
    DocGenError, DocumentGenerator, DocumentMerger, EmployeeRecord, FieldResolver, GeneratedDocument,
    InMemoryTemplate,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

fn jane(amount: &str) -> EmployeeRecord {
    EmployeeRecord::new("Jane", "Doe", Decimal::from_str(amount).unwrap())
}

fn generator(template: Vec<u8>) -> DocumentGenerator<InMemoryTemplate> {
    DocumentGenerator::new(InMemoryTemplate::new(template), FieldResolver::default())
}

fn region_texts(document: &GeneratedDocument) -> Vec<(String, String)> {
    DocumentMerger::new()
        .scan(document.bytes())
        .unwrap()
        .iter()
        .map(|region| (region.key().to_string(), region.text()))
        .collect()
}

#[test]
fn test_end_to_end_letter() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    let document = generator(raise_letter()).generate_on(&jane("500"), date).unwrap();

    assert_eq!(document.file_name(), "Jane Doe-2024-03-07.docx");
    assert_eq!(document.extension(), "docx");
    assert_eq!(
        document.mime_type(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(
        region_texts(&document),
        vec![
            ("EmployeeName".to_string(), "Jane Doe".to_string()),
            ("SalaryRaise".to_string(), "$500.00".to_string()),
        ]
    );
}

#[test]
fn test_salary_raise_uses_currency_format() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    let document = generator(raise_letter()).generate_on(&jane("1234.5"), date).unwrap();
    assert_eq!(region_texts(&document)[1].1, "$1,234.50");

    let german = DocumentGenerator::new(
        InMemoryTemplate::new(raise_letter()),
        FieldResolver::new(CurrencyFormat::for_locale("de-DE").unwrap()),
    );
    let document = german.generate_on(&jane("1234.5"), date).unwrap();
    assert_eq!(region_texts(&document)[1].1, "1.234,50\u{00A0}€");
}

#[test]
fn test_generate_uses_current_date() {
    let before = chrono::Local::now().date_naive();
    let document = generator(raise_letter()).generate(&jane("500")).unwrap();
    let after = chrono::Local::now().date_naive();

    // the run may straddle midnight
    let expected: Vec<String> = [before, after]
        .iter()
        .map(|date| format!("Jane Doe-{}.docx", date.format("%Y-%m-%d")))
        .collect();
    assert!(expected.contains(&document.file_name().to_string()));
}

#[test]
fn test_unknown_placeholder_fails_for_every_record() {
    let body = paragraph(&format!(
        "{}{}",
        control("EmployeeName", &["name"]),
        control("ManagerName", &["manager"])
    ));
    let generator = generator(build_package(&[("word/document.xml", document_xml(&body))]));

    for record in [jane("500"), EmployeeRecord::new("John", "Smith", Decimal::ZERO)] {
        let err = generator.generate(&record).unwrap_err();
        assert!(matches!(err, DocGenError::UnknownPlaceholder { ref key } if key == "ManagerName"));
    }
    assert!(matches!(
        generator.check_template().unwrap_err(),
        DocGenError::UnknownPlaceholder { .. }
    ));
}

#[test]
fn test_static_fields_fill_extra_placeholders() {
    let body = paragraph(&format!(
        "{}{}",
        control("EmployeeName", &["name"]),
        control("CompanyName", &["company"])
    ));
    let mut fields = BTreeMap::new();
    fields.insert("CompanyName".to_string(), "Acme Corp".to_string());
    let generator = DocumentGenerator::new(
        InMemoryTemplate::new(build_package(&[("word/document.xml", document_xml(&body))])),
        FieldResolver::default().with_static_fields(fields),
    );

    assert_eq!(generator.check_template().unwrap(), vec!["EmployeeName", "CompanyName"]);

    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    let document = generator.generate_on(&jane("1"), date).unwrap();
    assert_eq!(region_texts(&document)[1], ("CompanyName".to_string(), "Acme Corp".to_string()));
}

#[test]
fn test_records_do_not_bleed_into_each_other() {
    let generator = generator(raise_letter());
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();

    let first = generator.generate_on(&jane("500"), date).unwrap();
    let second = generator
        .generate_on(&EmployeeRecord::new("John", "Smith", Decimal::new(75, 0)), date)
        .unwrap();

    assert_eq!(region_texts(&first)[0].1, "Jane Doe");
    assert_eq!(region_texts(&second)[0].1, "John Smith");
    assert_eq!(region_texts(&second)[1].1, "$75.00");
}

#[test]
fn test_malformed_template_produces_nothing() {
    let generator = generator(b"plain text, not a package".to_vec());
    let err = generator.generate(&jane("500")).unwrap_err();
    assert!(matches!(err, DocGenError::ZipError(_)));
}
