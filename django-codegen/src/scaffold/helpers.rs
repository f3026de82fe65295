//! Naming helpers for code generation
//!
//! Derived names (verbose names, admin classes, route prefixes and route
//! names) all come from the entity name through these helpers so every
//! artifact agrees on them.

use inflector::Inflector;

/// Naming conventions shared by the templates
pub struct TemplateHelpers;

impl TemplateHelpers {
    /// Convert string to `snake_case`
    ///
    /// # Examples
    ///
    /// ```
    /// # use django_codegen::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_snake_case("UserProfile"), "user_profile");
    /// assert_eq!(TemplateHelpers::to_snake_case("Blog"), "blog");
    /// ```
    #[must_use]
    pub fn to_snake_case(input: &str) -> String {
        input.to_snake_case()
    }

    /// Convert string to kebab-case
    ///
    /// # Examples
    ///
    /// ```
    /// # use django_codegen::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_kebab_case("UserProfile"), "user-profile");
    /// ```
    #[must_use]
    pub fn to_kebab_case(input: &str) -> String {
        input.to_kebab_case()
    }

    /// Pluralize a word
    ///
    /// # Examples
    ///
    /// ```
    /// # use django_codegen::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::pluralize("blog"), "blogs");
    /// assert_eq!(TemplateHelpers::pluralize("category"), "categories");
    /// ```
    #[must_use]
    pub fn pluralize(input: &str) -> String {
        input.to_plural()
    }

    /// Human readable singular name, as Django's `verbose_name`
    ///
    /// # Examples
    ///
    /// ```
    /// # use django_codegen::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::verbose_name("Blog"), "blog");
    /// assert_eq!(TemplateHelpers::verbose_name("UserProfile"), "user profile");
    /// ```
    #[must_use]
    pub fn verbose_name(model: &str) -> String {
        model.to_title_case().to_lowercase()
    }

    /// Human readable plural name; only the last word is pluralized
    ///
    /// # Examples
    ///
    /// ```
    /// # use django_codegen::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::verbose_name_plural("Blog"), "blogs");
    /// assert_eq!(TemplateHelpers::verbose_name_plural("UserProfile"), "user profiles");
    /// ```
    #[must_use]
    pub fn verbose_name_plural(model: &str) -> String {
        let singular = Self::verbose_name(model);
        match singular.rsplit_once(' ') {
            Some((head, last)) => format!("{head} {}", Self::pluralize(last)),
            None => Self::pluralize(&singular),
        }
    }

    /// Name of the generated admin class
    #[must_use]
    pub fn admin_class(model: &str) -> String {
        format!("{model}Admin")
    }

    /// URL prefix of the entity's routes (kebab-case plural, trailing slash)
    ///
    /// # Examples
    ///
    /// ```
    /// # use django_codegen::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::route_prefix("Blog"), "blogs/");
    /// assert_eq!(TemplateHelpers::route_prefix("UserProfile"), "user-profiles/");
    /// ```
    #[must_use]
    pub fn route_prefix(model: &str) -> String {
        let kebab = Self::to_kebab_case(model);
        let plural = match kebab.rsplit_once('-') {
            Some((head, last)) => format!("{head}-{}", Self::pluralize(last)),
            None => Self::pluralize(&kebab),
        };
        format!("{plural}/")
    }

    /// Name of one route, e.g. `blog-list`
    ///
    /// # Examples
    ///
    /// ```
    /// # use django_codegen::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::route_name("Blog", "list"), "blog-list");
    /// assert_eq!(TemplateHelpers::route_name("UserProfile", "detail"), "user-profile-detail");
    /// ```
    #[must_use]
    pub fn route_name(model: &str, action: &str) -> String {
        format!("{}-{action}", Self::to_kebab_case(model))
    }

    /// Whether a name is `PascalCase`
    #[must_use]
    pub fn is_pascal_case(name: &str) -> bool {
        name.chars().next().is_some_and(char::is_uppercase) && !name.contains('_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names_for_compound_entity() {
        assert_eq!(TemplateHelpers::verbose_name("BlogPost"), "blog post");
        assert_eq!(TemplateHelpers::verbose_name_plural("BlogPost"), "blog posts");
        assert_eq!(TemplateHelpers::admin_class("BlogPost"), "BlogPostAdmin");
        assert_eq!(TemplateHelpers::route_prefix("BlogPost"), "blog-posts/");
        assert_eq!(TemplateHelpers::route_name("BlogPost", "list"), "blog-post-list");
    }

    #[test]
    fn test_plural_of_y_ending() {
        assert_eq!(TemplateHelpers::verbose_name_plural("Category"), "categories");
        assert_eq!(TemplateHelpers::route_prefix("Category"), "categories/");
    }

    #[test]
    fn test_is_pascal_case() {
        assert!(TemplateHelpers::is_pascal_case("Blog"));
        assert!(TemplateHelpers::is_pascal_case("UserProfile"));
        assert!(!TemplateHelpers::is_pascal_case("blog"));
        assert!(!TemplateHelpers::is_pascal_case("User_Profile"));
    }
}
