use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wikifeat_core::info::{AttributeMatcher, InfoExtractor};
use wikifeat_core::text::remove_brackets;
use wikifeat_core::{Document, fit};

fn bench_parse(c: &mut Criterion) {
    let small = std::fs::read_to_string("../../tests/fixtures/commons_cc0.html").unwrap();
    let medium = std::fs::read_to_string("../../tests/fixtures/ru_main_page.html").unwrap();

    let mut group = c.benchmark_group("parse");

    group.bench_with_input(BenchmarkId::new("plain", "description_page"), &small, |b, html| {
        b.iter(|| Document::parse(black_box(html)))
    });

    group.bench_with_input(BenchmarkId::new("sanitized", "main_page"), &medium, |b, html| {
        b.iter(|| Document::parse_sanitized(black_box(html)))
    });

    group.finish();
}

fn bench_attribution(c: &mut Criterion) {
    let html = std::fs::read_to_string("../../tests/fixtures/commons_cc_by_sa.html").unwrap();
    let doc = Document::parse(&html).unwrap();
    let extractor = InfoExtractor::with_base("https://commons.wikimedia.org");

    c.bench_function("author_lookup", |b| {
        b.iter(|| extractor.lookup_by_attribute(black_box(&doc), AttributeMatcher::Id("fileinfotpl_aut"), Some(&["td", "th"])))
    });
}

fn bench_fit(c: &mut Criterion) {
    let paragraph = "Мост построен по приказу князя А. Б. Иванова[1] и реставрирован в 1890-х годах[2]. ".repeat(20);
    let paragraphs = vec![paragraph.clone(), paragraph.clone(), paragraph];

    c.bench_function("remove_brackets", |b| b.iter(|| remove_brackets(black_box(&paragraphs[0]))));
    c.bench_function("fit_photo_caption", |b| b.iter(|| fit(black_box(&paragraphs), black_box(900))));
}

criterion_group!(benches, bench_parse, bench_attribution, bench_fit);
criterion_main!(benches);
