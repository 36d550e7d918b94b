//! Integration tests for whole-document conversion.

use std::collections::HashMap;

use chrono::NaiveDate;
use html2rtf::{
    convert_batch, convert_bytes, convert_file, convert_with_options, Error, Html2Rtf,
    RenderOptions, WidthMode,
};

const SAMPLE: &str = include_str!("fixtures/sample.html");

fn fixed_options() -> RenderOptions {
    let created = NaiveDate::from_ymd_opt(2011, 9, 28)
        .unwrap()
        .and_hms_opt(14, 5, 0)
        .unwrap();
    RenderOptions::new().with_created(created)
}

fn convert_sample(options: RenderOptions) -> html2rtf::RenderResult {
    Html2Rtf::new()
        .offline()
        .with_options(options)
        .convert(SAMPLE)
        .unwrap()
}

/// Open minus closed groups, skipping escaped characters.
fn group_balance(rtf: &str) -> i64 {
    let mut depth = 0;
    let mut chars = rtf.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

#[test]
fn test_sample_document_structure() {
    let result = convert_sample(fixed_options());
    let rtf = &result.content;

    assert!(rtf.starts_with("{\\rtf1"));
    assert!(rtf.trim_end().ends_with('}'));
    assert_eq!(group_balance(rtf), 0);
    assert!(!rtf.contains("%%"));
    assert!(!rtf.contains("comment shouldn't show"));
    assert!(!rtf.contains(".boldy"));
}

#[test]
fn test_sample_info_group() {
    let result = convert_sample(fixed_options());

    assert_eq!(result.title.as_deref(), Some("doc title"));
    assert!(result.content.contains("{\\title doc title}"));
    assert!(result
        .content
        .contains("{\\creatim\\yr2011\\mo9\\dy28\\hr14\\min5}"));
}

#[test]
fn test_sample_formatting() {
    let rtf = convert_sample(fixed_options()).content;

    assert!(rtf.contains("\\keepn {\\b\\fs48 H1 Text}"));
    assert!(rtf.contains("{\\b\\fs36 standard formatting tests}"));
    assert!(rtf.contains("{\\b bold tag}"));
    assert!(rtf.contains("{\\b strong tag}"));
    assert!(rtf.contains("{\\b css styled bold span}"));
    assert!(rtf.contains("{\\b\\ul Span with bold class and underline style}"));
    assert!(rtf.contains("{\\i\\ul css styled span}"));
    assert!(rtf.contains("{\\uld CSS style dotted underline}"));
    assert!(rtf.contains("{\\uldash Inline styled dashed}"));
    assert!(rtf.contains("1.\\tab list item"));
    assert!(rtf.contains("2.\\tab list item2"));
    assert!(rtf.contains("\\bullet\\tab list item"));
}

#[test]
fn test_sample_special_characters() {
    let result = convert_sample(fixed_options());
    let rtf = &result.content;

    assert!(rtf.contains("&,\\'e9,\",',\\~,\\'e8"));
    assert!(rtf.contains("{\\u1268  }"));
    assert!(rtf.contains("{\\u345  }"));
    assert!(rtf.contains("{\\u19971  }"));
    assert!(rtf.contains("{\\u26481  }{\\u20140  }"));
    assert_eq!(result.stats.special_char_count, 9);
}

#[test]
fn test_sample_colour_table() {
    let result = convert_sample(fixed_options());
    let rtf = &result.content;

    assert!(rtf.contains(";\\red0\\green191\\blue255;\\red255\\green255\\blue0;}"));
    assert!(rtf.contains("{\\cf6 text }"));
    assert!(rtf.contains("{\\highlight7 highlighted}"));
    assert_eq!(result.stats.color_count, 2);
}

#[test]
fn test_sample_tables() {
    let result = convert_sample(fixed_options());
    let rtf = &result.content;

    // longest words "Username" and "September", plus one, at 96 twips each
    assert!(rtf.contains("\\trowd\\trgaph196\\trleft0\\cellx1256\\cellx2608\n"));
    assert!(rtf.contains("\\pard\\intbl\\qr Date\\cell "));
    assert!(rtf.contains("\\pard\\intbl\\ql {\\b 28 September 2005}\\cell "));

    assert!(rtf.contains("\\pard\\qc {\\i caption}\\par\n"));
    assert!(rtf.contains("\\clbrdrt\\brdrs\\brdrw10"));
    assert!(rtf.contains("\\pard\\intbl {\\b 1}\\cell "));
    assert_eq!(result.stats.table_count, 2);
}

#[test]
fn test_sample_link_and_form() {
    let result = convert_sample(fixed_options());
    let rtf = &result.content;

    assert!(rtf.contains("{\\field{\\*\\fldinst{HYPERLINK \"http://www.open.ac.uk\"}}"));
    assert!(rtf.contains("{\\fldrslt{\\ul\\cf2 hyperlink}}}"));
    assert!(rtf.contains("FORMCHECKBOX"));
    assert!(rtf.contains("\\ffdefres1"));
    assert!(rtf.contains("A checkbox"));
}

#[test]
fn test_sample_stats() {
    let stats = convert_sample(fixed_options()).stats;

    assert_eq!(stats.heading_count, 7);
    assert_eq!(stats.link_count, 1);
    assert_eq!(stats.list_item_count, 4);
    assert_eq!(stats.image_count, 0);
    assert_eq!(stats.missing_image_count, 1);
}

#[test]
fn test_conversions_are_isolated() {
    let converter = Html2Rtf::new().offline().with_options(fixed_options());

    let first = converter.convert(SAMPLE).unwrap();
    let other = converter
        .convert("<p><span style=\"color:#123456\">x</span></p>")
        .unwrap();
    let second = converter.convert(SAMPLE).unwrap();

    assert_eq!(first.content, second.content);
    assert!(other.content.contains("{\\cf6 x}"));
    assert!(other.content.contains(";\\red18\\green52\\blue86;}"));
}

#[test]
fn test_protection() {
    let unprotected = convert_sample(fixed_options()).content;
    assert!(!unprotected.contains("\\formprot"));

    let protected = convert_sample(fixed_options().with_protection(true)).content;
    assert!(protected.contains("\\formprot\\allprot"));
}

#[test]
fn test_protection_from_params() {
    let mut params = HashMap::new();
    params.insert("document-protected".to_string(), "1".to_string());
    params.insert("font-size".to_string(), "11".to_string());

    let options = RenderOptions::from_params(&params).unwrap().with_info(false);
    let rtf = convert_with_options("<p>x</p>", &options, None).unwrap();

    assert!(rtf.contains("\\formprot\\allprot"));
    assert!(rtf.contains("\\fs22"));
}

#[test]
fn test_without_info_group() {
    let rtf = convert_sample(RenderOptions::new().with_info(false)).content;
    assert!(!rtf.contains("{\\info"));
}

#[test]
fn test_width_mode_changes_cells() {
    let html = "<table><tr><td>aa bbbb</td><td>c</td></tr></table>";
    let convert = |mode| {
        Html2Rtf::new()
            .offline()
            .with_options(RenderOptions::new().with_info(false).with_width_mode(mode))
            .convert(html)
            .unwrap()
            .content
    };

    // longest word 4 + 1 = 5 versus whole cell 7
    assert!(convert(WidthMode::CumulativeMax).contains("\\cellx872\\cellx1456"));
    assert!(convert(WidthMode::CumulativeTotal).contains("\\cellx1064\\cellx1552"));
}

#[test]
fn test_custom_template_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.rtf");
    std::fs::write(&path, "{\\rtf1{\\colortbl;%%COLOURTABLE%%;}%%BODY%%}").unwrap();

    let options = RenderOptions::new().with_info(false).with_template(&path);
    let rtf = convert_with_options(
        "<p><font color=\"#ff0000\">red</font></p>",
        &options,
        None,
    )
    .unwrap();

    assert_eq!(
        rtf,
        "{\\rtf1{\\colortbl;;\\red255\\green0\\blue0;}\\pard\\sa120 {\\cf6 red}\\par\n}"
    );
}

#[test]
fn test_template_without_body_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.rtf");
    std::fs::write(&path, "{\\rtf1 nothing here}").unwrap();

    let options = RenderOptions::new().with_template(&path);
    let err = convert_with_options("<p>x</p>", &options, None).unwrap_err();
    assert!(matches!(err, Error::Template(_)));
}

#[test]
fn test_missing_template_file_fails() {
    let options = RenderOptions::new().with_template("/nonexistent/template.rtf");
    let err = convert_with_options("<p>x</p>", &options, None).unwrap_err();
    assert!(matches!(err, Error::Template(_)));
}

#[test]
fn test_empty_input_is_malformed() {
    let err = convert_with_options("", &RenderOptions::default(), None).unwrap_err();
    assert!(err.is_parse_stage());

    let err = convert_bytes(b"  \n", &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
}

#[test]
fn test_convert_bytes_replaces_invalid_utf8() {
    let rtf = convert_bytes(b"<p>a\xffb</p>", &RenderOptions::new().with_info(false)).unwrap();
    assert!(rtf.contains("a{\\u65533  }b"));
}

#[test]
fn test_convert_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(&path, "<html><head><title>From file</title></head><body><p>Body</p></body></html>")
        .unwrap();

    let rtf = convert_file(&path, &RenderOptions::default()).unwrap();
    assert!(rtf.contains("{\\title From file}"));
    assert!(rtf.contains("Body"));

    let err = convert_file(dir.path().join("missing.html"), &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_batch_matches_single_conversion() {
    let options = fixed_options();
    let inputs = vec![
        "<html><head><title>doc title</title></head><body><p>first</p></body></html>".to_string(),
        "<p>second</p>".to_string(),
    ];
    let results = convert_batch(&inputs, &options);

    let single = Html2Rtf::new()
        .with_options(options.clone())
        .convert("<p>second</p>")
        .unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0].as_ref().unwrap().contains("{\\title doc title}"));
    assert_eq!(results[1].as_ref().unwrap(), &single.content);
}

#[test]
fn test_strict_mode_rejects_broken_markup() {
    let lenient = Html2Rtf::new().offline().convert("<p>a</p></table>");
    assert!(lenient.is_ok());

    let strict = Html2Rtf::new().offline().strict().convert("<p>a</p></table>");
    assert!(matches!(strict, Err(Error::MalformedInput(_))));
}
