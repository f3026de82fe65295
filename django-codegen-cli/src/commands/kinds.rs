//! `django-codegen kinds`

use std::fmt::Write;

use console::style;
use django_codegen::scaffold::{django_class, FieldKind};

/// Print every field kind with its Django class and modifiers
pub fn execute() {
    print!("{}", render());
}

/// Kind table, one row per kind in menu order
#[must_use]
pub fn render() -> String {
    let mut out = format!(
        "{}\n",
        style(format!("{:>3}  {:<20} {:<25} {}", "#", "KIND", "DJANGO CLASS", "MODIFIERS")).bold()
    );

    for (index, kind) in FieldKind::ALL.into_iter().enumerate() {
        let required = kind.required_modifiers();
        let modifiers: Vec<String> = kind
            .allowed_modifiers()
            .into_iter()
            .map(|m| {
                if required.contains(&m) {
                    format!("{}*", m.token())
                } else {
                    m.token().to_string()
                }
            })
            .collect();

        let _ = writeln!(
            out,
            "{index:>3}  {:<20} {:<25} {}",
            kind.token(),
            django_class(kind),
            modifiers.join(" ")
        );
    }

    let _ = writeln!(out, "\n{}", style("* required").dim());
    out
}
