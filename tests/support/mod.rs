//! Shared fixtures for the integration suites: generated PDFs, book pages,
//! and a mock site.

use std::path::{Path, PathBuf};

use content_select_downloader::Config;
use lopdf::{dictionary, Document, Object, Stream};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build a PDF with one page per entry. Each page's MediaBox width is the
/// given value, so page order survives a merge and can be read back.
#[allow(dead_code)]
pub fn make_pdf(page_widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();

    for width in page_widths {
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Integer(*width), 792.into()],
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_widths.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("failed to serialize test PDF");
    buffer
}

/// MediaBox width of each page of the PDF at `path`, in page order.
#[allow(dead_code)]
pub fn page_widths(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).expect("output should be a readable PDF");
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_object(*id).unwrap().as_dict().unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

/// A book page whose print list names `chapters`.
#[allow(dead_code)]
pub fn print_list_page(chapters: &[&str]) -> String {
    let items: String = chapters
        .iter()
        .map(|id| format!(r##"<li><a href="#" data-chapter-id="{}">Chapter {}</a></li>"##, id, id))
        .collect();
    format!(
        r#"<html><body><div id="viewer"></div><ul id="printList">{}</ul></body></html>"#,
        items
    )
}

/// A book page that only has the outline sidebar.
#[allow(dead_code)]
pub fn outline_page(chapters: &[&str]) -> String {
    let items: String = chapters
        .iter()
        .map(|id| format!(r##"<div class="outlineItem"><a href="#chapter={}">{}</a></div>"##, id, id))
        .collect();
    format!(r#"<html><body><nav>{}</nav></body></html>"#, items)
}

/// A listing page linking to each of `hrefs`.
#[allow(dead_code)]
pub fn listing_page(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| format!(r#"<div class="book-item"><a href="{}">Book</a></div>"#, href))
        .collect();
    format!(r#"<html><body><section>{}</section></body></html>"#, items)
}

#[allow(dead_code)]
pub fn pdf_response(page_widths: &[i64]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(make_pdf(page_widths), "application/pdf")
}

#[allow(dead_code)]
pub async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_fragment(
    server: &MockServer,
    document_id: &str,
    chapter_id: &str,
    response: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(format!("/media/display/{}/{}", document_id, chapter_id)))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Config pointing fragment downloads at `server`, with scratch directories
/// under `root`.
#[allow(dead_code)]
pub fn test_config(server: &MockServer, root: &Path) -> Config {
    let mut config = Config::default();
    config.http.fragment_base_url = format!("{}/media/display", server.uri());
    config.http.timeout_seconds = 10;
    config.options.download_directory = Some(root.join("out"));
    config.options.temp_directory = Some(root.join("fragments"));
    config.queue.poll_interval_ms = 50;
    config.queue.idle_ms = 10;
    config
}

/// Files left in a directory; a missing directory counts as empty.
#[allow(dead_code)]
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}
