//! Built-in minijinja templates
//!
//! Field declarations are rendered in Rust by
//! [`render_declaration`](super::emitter::render_declaration) and passed in
//! as finished lines.

/// Template names registered in the emitter environment
pub mod names {
    /// Model class
    pub const MODEL: &str = "model.py";
    /// `class Meta:` of a model
    pub const META: &str = "meta.py";
    /// `ordering = [...]`
    pub const ORDERING: &str = "ordering.py";
    /// Admin registration class
    pub const ADMIN: &str = "admin.py";
    /// `list_display = [...]`
    pub const LIST_DISPLAY: &str = "list_display.py";
    /// `urlpatterns` table
    pub const URL_TABLE: &str = "urls.py";
    /// One `path(...)` entry
    pub const URL_ENTRY: &str = "url_entry.py";
    /// Complete new file
    pub const NEW_FILE: &str = "new_file.py";
}

/// Model class: `Meta` first, then one line per field
pub const MODEL: &str = r"class {{ name }}({{ base }}):
{%- for line in meta %}
    {{ line }}
{%- endfor %}
{% for field in fields %}
    {{ field }}
{%- endfor %}";

/// Options class of a model
pub const META: &str = r#"class Meta:
    verbose_name = "{{ verbose_name }}"
    verbose_name_plural = "{{ verbose_name_plural }}"
{%- if ordering %}
    {{ ordering }}
{%- endif %}"#;

/// `Meta.ordering`
pub const ORDERING: &str =
    r#"ordering = [{% for entry in ordering %}"{{ entry }}"{% if not loop.last %}, {% endif %}{% endfor %}]"#;

/// Admin registration; `pass` when nothing can be listed
pub const ADMIN: &str = r"@admin.register({{ name }})
class {{ admin_class }}({{ admin_base }}):
    {{ body }}";

/// Columns of the admin change list
pub const LIST_DISPLAY: &str =
    r#"list_display = [{% for field in fields %}"{{ field }}"{% if not loop.last %}, {% endif %}{% endfor %}]"#;

/// URL table holding every entry
pub const URL_TABLE: &str = r"urlpatterns = [
{%- for route in routes %}
    {{ route }},
{%- endfor %}
]";

/// One URL entry using a generic class-based view
pub const URL_ENTRY: &str =
    r#"path("{{ path }}", {{ view }}.as_view(model={{ model }}), name="{{ route_name }}")"#;

/// Whole file: import lines, then declarations separated by two blank lines
pub const NEW_FILE: &str = r"{% for line in imports %}{{ line }}
{% endfor %}{% for block in blocks %}{% if imports or not loop.first %}

{% endif %}{{ block }}
{% endfor %}";
