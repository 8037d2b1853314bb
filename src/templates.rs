use tera::Tera;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("submissions.html", include_str!("../templates/submissions.html")),
    ("submission.html", include_str!("../templates/submission.html")),
];

/// Compiles the page templates bundled into the binary. `.html` names get
/// Tera's autoescaping, so remote text is never injected as markup.
pub fn build_tera() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}
