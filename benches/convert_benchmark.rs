//! Benchmarks for html2rtf conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks convert synthetic documents of growing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Creates a synthetic document with the given number of sections.
fn create_test_html(sections: usize) -> String {
    let mut html = String::from(
        "<html><head><title>Benchmark</title>\
         <style>.hl{color:#cc0000;font-weight:bold}</style></head><body>",
    );

    for i in 0..sections {
        html.push_str(&format!("<h2>Section {}</h2>", i + 1));
        html.push_str(
            "<p>Plain text with <b>bold</b>, <i>italic</i> and \
             <span class=\"hl\">highlighted</span> words, caf\u{e9} \u{6771}\u{4eac}.</p>",
        );
        html.push_str(&format!(
            "<p><span style=\"color:#{:06x}\">colour {}</span></p>",
            i * 4099 % 0xffffff,
            i
        ));
        html.push_str(
            "<table border=\"1\"><tr><th>Name</th><th>Value</th></tr>\
             <tr><td>alpha</td><td>first row of the table</td></tr>\
             <tr><td>beta</td><td>second</td></tr></table>",
        );
        html.push_str("<ul><li>one</li><li>two</li></ul>");
    }

    html.push_str("</body></html>");
    html
}

/// Benchmark parsing alone, including the non-ASCII splitting pass.
fn bench_parsing(c: &mut Criterion) {
    let html = create_test_html(10);

    c.bench_function("parse_10_sections", |b| {
        b.iter(|| html2rtf::parse_html(black_box(&html)).unwrap());
    });
}

/// Benchmark whole conversions at various sizes.
fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    let converter = html2rtf::Html2Rtf::new()
        .offline()
        .with_options(html2rtf::RenderOptions::new().with_info(false));

    for sections in [1, 10, 50].iter() {
        let html = create_test_html(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| converter.convert(black_box(&html)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark parallel batch conversion.
fn bench_batch(c: &mut Criterion) {
    let inputs: Vec<String> = (0..16).map(|_| create_test_html(5)).collect();
    let options = html2rtf::RenderOptions::new().with_info(false);

    c.bench_function("batch_16_documents", |b| {
        b.iter(|| html2rtf::convert_batch(black_box(&inputs), &options));
    });
}

criterion_group!(benches, bench_parsing, bench_conversion, bench_batch);
criterion_main!(benches);
