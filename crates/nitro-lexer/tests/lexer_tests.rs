use insta::assert_snapshot;
use nitro_lexer::Lexer;

/// Render tokens one per line as `Kind@start..end "text"`.
fn dump(source: &str) -> String {
    Lexer::tokenize(source)
        .into_iter()
        .map(|tok| {
            let text = &source[tok.span.start as usize..tok.span.end as usize];
            format!("{:?}@{}..{} {:?}", tok.kind, tok.span.start, tok.span.end, text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn route_with_select() {
    let source = "get /users/{id} () { select name from users where id = {id} }";
    assert_snapshot!(dump(source), @r#"
    Ident@0..3 "get"
    Slash@4..5 "/"
    Ident@5..10 "users"
    Slash@10..11 "/"
    LBrace@11..12 "{"
    Ident@12..14 "id"
    RBrace@14..15 "}"
    LParen@16..17 "("
    RParen@17..18 ")"
    LBrace@19..20 "{"
    Ident@21..27 "select"
    Ident@28..32 "name"
    Ident@33..37 "from"
    Ident@38..43 "users"
    Ident@44..49 "where"
    Ident@50..52 "id"
    Eq@53..54 "="
    LBrace@55..56 "{"
    Ident@56..58 "id"
    RBrace@58..59 "}"
    RBrace@60..61 "}"
    Eof@61..61 ""
    "#);
}

#[test]
fn tag_with_literal_and_capture_attributes() {
    let source = r#"<a href="/x" class={cls}>Go "now"</a>"#;
    assert_snapshot!(dump(source), @r#"
    LAngle@0..1 "<"
    Ident@1..2 "a"
    Ident@3..7 "href"
    Eq@7..8 "="
    StringLiteral@8..12 "\"/x\""
    Ident@13..18 "class"
    Eq@18..19 "="
    LBrace@19..20 "{"
    Ident@20..23 "cls"
    RBrace@23..24 "}"
    RAngle@24..25 ">"
    Text@25..33 "Go \"now\""
    LAngleSlash@33..35 "</"
    Ident@35..36 "a"
    RAngle@36..37 ">"
    Eof@37..37 ""
    "#);
}

#[test]
fn dashed_attribute_names() {
    let kinds: Vec<_> = Lexer::tokenize(r#"<div data-id="1" />"#)
        .into_iter()
        .map(|t| format!("{:?}", t.kind))
        .collect();
    assert_eq!(
        kinds,
        ["LAngle", "Ident", "UrlIdent", "Eq", "StringLiteral", "SlashRAngle", "Eof"]
    );
}

#[test]
fn mismatched_close_tag_still_lexes() {
    let kinds: Vec<_> = Lexer::tokenize("<div>hello</span>")
        .into_iter()
        .map(|t| format!("{:?}", t.kind))
        .collect();
    assert_eq!(
        kinds,
        ["LAngle", "Ident", "RAngle", "Text", "LAngleSlash", "Ident", "RAngle", "Eof"]
    );
}
