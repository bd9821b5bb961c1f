use pretty_assertions::assert_eq;
use replyquote_lib::{quote_html, quote_html_with, WrapperSpec};

#[test]
fn test_quote_html_with_body() {
    let received = r#"
<html><head>
<style>
body > div { color: red; }
p { font-size: 12px; }
</style>
</head><body ID="b" Class="main">the <p>Original content</p></body></html>
"#;
    let expected = r#"
<html>
 <head>
  <style>
   div#quoted_email > div { color: red; }
p { font-size: 12px; }
  </style>
 </head>
 <body>
  New content
  <div class="main" id="quoted_email">
   the
   <p>
    Original content
   </p>
  </div>
 </body>
</html>
"#;
    let result = quote_html(received, "New content").unwrap();
    assert_eq!(result.trim(), expected.trim());
}

#[test]
fn test_quote_html_without_body() {
    let expected = r#"
<html>
 <head>
  <style>
  </style>
 </head>
 <body>
  New content
  <div id="quoted_email">
   <p>
    Original content
   </p>
  </div>
 </body>
</html>
"#;
    let result = quote_html("<p>Original content</p>", "New content").unwrap();
    assert_eq!(result.trim(), expected.trim());
}

#[test]
fn test_quote_html_body_no_head() {
    let received = "<html><body><p>Original content</p></body></html>";
    let expected = r#"
<html>
 <body>
  New content
  <div id="quoted_email">
   <p>
    Original content
   </p>
  </div>
 </body>
</html>
"#;
    let result = quote_html(received, "New content").unwrap();
    assert_eq!(result.trim(), expected.trim());
}

#[test]
fn test_quote_html_bare_body() {
    let received = "<BODY><p>Original content</p></BODY>";
    let expected = r#"
<body>
 New content
 <div id="quoted_email">
  <p>
   Original content
  </p>
 </div>
</body>
"#;
    let result = quote_html(received, "New content").unwrap();
    assert_eq!(result.trim(), expected.trim());
}

#[test]
fn test_quote_html_keeps_doctype_and_head_content() {
    let received = r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"><title>Hi</title>
<style>BODY.main { margin: 0 }</style></head>
<body class="main" style="margin: 4px"><table><tr><td>cell</td></tr></table></body></html>"#;
    let expected = r#"
<!DOCTYPE html>
<html lang="en">
 <head>
  <meta charset="utf-8"/>
  <title>
   Hi
  </title>
  <style>
   div#quoted_email.main { margin: 0 }
  </style>
 </head>
 <body>
  <p>
   Reply &amp; thanks
  </p>
  <div class="main" id="quoted_email" style="margin: 4px">
   <table>
    <tr>
     <td>
      cell
     </td>
    </tr>
   </table>
  </div>
 </body>
</html>
"#;
    let result = quote_html(received, "<p>Reply &amp; thanks</p>").unwrap();
    assert_eq!(result.trim(), expected.trim());
}

#[test]
fn test_quote_html_with_custom_wrapper_id() {
    let received = "<html><head><style>body#content { background: white; }</style></head>\
                    <body id=\"content\">hello</body></html>";
    let result = quote_html_with(received, "", &WrapperSpec::new("earlier")).unwrap();
    assert!(
        result.contains("div#earlier { background: white; }"),
        "{}",
        result
    );
    assert!(result.contains(r#"<div id="earlier">"#), "{}", result);
    assert!(result.contains(" <body>\n"), "{}", result);
}

#[test]
fn test_quote_html_nested_at_rules_survive() {
    let css = "@media screen { @supports (display: grid) { body { display: grid; } } }";
    let received = format!("<html><head><style>{}</style></head><body>x</body></html>", css);
    let result = quote_html(&received, "").unwrap();
    assert!(result.contains(&format!("   {}\n", css)), "{}", result);
}

#[test]
fn test_quote_html_tolerates_tag_soup() {
    let received = "<body><div><p>one<p>two</div></span><b>bold</body>";
    let expected = r#"
<body>
 <div id="quoted_email">
  <div>
   <p>
    one
   </p>
   <p>
    two
   </p>
  </div>
  <b>
   bold
  </b>
 </div>
</body>
"#;
    let result = quote_html(received, "").unwrap();
    assert_eq!(result.trim(), expected.trim());
}

#[test]
fn test_quote_html_is_independent_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                quote_html(&format!("<p>message {}</p>", i), "reply").unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.join().unwrap();
        assert!(result.contains(&format!("    message {}\n", i)), "{}", result);
    }
}

#[test]
fn test_quote_html_deeply_nested_input_on_small_stack() {
    let depth = 5_000;
    let received = format!("<body>{}x", "<div>".repeat(depth));
    let result = std::thread::Builder::new()
        .stack_size(1024 * 1024)
        .spawn(move || quote_html(&received, "").unwrap())
        .unwrap()
        .join()
        .unwrap();
    assert!(result.starts_with("<body>\n <div id=\"quoted_email\">\n  <div>\n"));
    // body, wrapper, then the nested divs.
    let text_line = format!("\n{}x\n", " ".repeat(depth + 2));
    assert!(result.contains(&text_line));
    assert_eq!(result.matches("</div>").count(), depth + 1);
}

#[test]
fn test_quote_html_escapes_text_of_non_raw_elements_once() {
    let received = "<body><xmp>a &amp; b</xmp><iframe>x &lt; y</iframe></body>";
    let expected = r#"
<body>
 <div id="quoted_email">
  <xmp>
   a &amp; b
  </xmp>
  <iframe>
   x &lt; y
  </iframe>
 </div>
</body>
"#;
    assert_eq!(quote_html(received, "").unwrap(), expected.trim_start());
}
