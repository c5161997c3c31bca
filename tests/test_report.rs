//! Integration test: PDF report generation

use std::path::PathBuf;

use neuroscan::report::{generate, wrap_text, ReportData};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("neuroscan-report-test");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn write_test_image(name: &str) -> PathBuf {
    let path = scratch(name);
    let img = image::RgbImage::from_fn(64, 48, |x, y| image::Rgb([(x * 4) as u8, (y * 5) as u8, 80]));
    img.save(&path).unwrap();
    path
}

fn sample_data(symptom_count: usize) -> ReportData {
    ReportData {
        label: "Glioma".to_string(),
        confidence: "97.31%".to_string(),
        description: "A tumor that starts in the support cells of the brain (called glial cells). Its seriousness depends on how aggressive the tumor cells are (their grade) and where the tumor is located.".to_string(),
        cause: "Often due to random changes in cells' DNA. Sometimes previous head radiation can increase risk, but often the exact cause is unknown.".to_string(),
        symptoms: (0..symptom_count)
            .map(|i| format!("Symptom number {i}"))
            .collect(),
    }
}

fn page_count(path: &PathBuf) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

#[test]
fn short_symptom_list_fits_one_page() {
    let patient = write_test_image("patient-short.png");
    let output = scratch("short.pdf");
    generate(&sample_data(5), &patient, None, &output).unwrap();
    assert_eq!(page_count(&output), 1);
}

#[test]
fn long_symptom_list_paginates() {
    let patient = write_test_image("patient-long.png");
    let output = scratch("long.pdf");
    generate(&sample_data(12), &patient, None, &output).unwrap();
    assert!(page_count(&output) >= 2);
}

#[test]
fn long_body_text_pushes_thumbnails_to_next_page() {
    let patient = write_test_image("patient-longtext.png");
    let output = scratch("longtext.pdf");
    let mut data = sample_data(3);
    // Enough wrapped text that the image slot no longer fits below it.
    data.description = "magnetic resonance ".repeat(100).trim_end().to_string();
    data.cause = "unknown cause ".repeat(60).trim_end().to_string();
    generate(&data, &patient, None, &output).unwrap();
    assert!(page_count(&output) >= 2);
}

#[test]
fn reference_image_is_optional() {
    let patient = write_test_image("patient-ref.png");
    let reference = write_test_image("reference.png");
    let output = scratch("with-ref.pdf");
    generate(&sample_data(4), &patient, Some(&reference), &output).unwrap();
    assert_eq!(page_count(&output), 1);

    let output = scratch("missing-ref.pdf");
    let missing = PathBuf::from("/nonexistent/normal_brain_mri.jpg");
    generate(&sample_data(4), &patient, Some(&missing), &output).unwrap();
    assert_eq!(page_count(&output), 1);
}

#[test]
fn unreadable_patient_image_is_an_error() {
    let bogus = scratch("bogus.png");
    std::fs::write(&bogus, b"not an image").unwrap();
    let output = scratch("never.pdf");
    let err = generate(&sample_data(3), &bogus, None, &output).unwrap_err();
    assert!(matches!(err, neuroscan::ScanError::Report(_)));
}

#[test]
fn wrap_respects_word_boundaries() {
    let text = "Often due to random changes in cells' DNA.";
    let lines = wrap_text(text, 120.0, 11.0);
    assert!(lines.len() > 1);
    let rejoined = lines.join(" ");
    assert_eq!(rejoined, text);
}
