mod common;

use common::pdf_with_pages;
use docqa_service::services::pdf::{extract_pages, extract_text};

#[test]
fn pages_are_extracted_in_order() {
    let bytes = pdf_with_pages(&["Alpha page", "Beta page"]);

    let pages = extract_pages(&bytes).expect("PDF should parse");

    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("Alpha"));
    assert!(pages[1].contains("Beta"));
}

#[tokio::test]
async fn extracted_text_is_page_concatenation() {
    let bytes = pdf_with_pages(&["Alpha page", "Beta page", "Gamma page"]);
    let pages = extract_pages(&bytes).expect("PDF should parse");

    let text = extract_text("three-pages.pdf", bytes).await;

    assert_eq!(text, pages.concat());
    let alpha = text.find("Alpha").unwrap();
    let beta = text.find("Beta").unwrap();
    let gamma = text.find("Gamma").unwrap();
    assert!(alpha < beta && beta < gamma);
}
