//! Property tests for parsing, emitting and merging

use django_codegen::config::GeneratorConfig;
use django_codegen::error::{FieldError, MergeError};
use django_codegen::merge::{Change, MergeEngine, PythonAdapter, SourceAdapter};
use django_codegen::scaffold::field_type::validate_field_name;
use django_codegen::scaffold::{
    render_declaration, ArtifactFragment, ArtifactKind, Container, EntityBuilder, FieldDescriptor,
    FieldKind, FragmentTag, ModifierName, TemplateEmitter,
};
use proptest::prelude::*;

const BLOG: &str = "class Blog(models.Model):\n    title = models.CharField(max_length=250)\n";

const SNIPPETS: &[&str] = &[
    "import os\n",
    "from django.db import models\n",
    "\n",
    "# a comment with 'quotes' and [brackets\n",
    "X = 1\n",
    "NAMES = [\n    \"a\",  # first\n    'b',\n]\n",
    "def helper(a,\n           b):\n    return (a +\n            b)\n",
    "@decorator\nclass Other:\n    \"\"\"Doc with 'quotes'.\"\"\"\n    x = \"#not a comment\"\n",
    "if True:\n    y = 2\nelse:\n    y = 3\n",
    "s = '''multi\nline'''\n",
    "value = 1 + \\\n    2\n",
    "class Empty: pass\n",
];

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}".prop_filter("reserved field name", |name| {
        validate_field_name(name).is_ok()
    })
}

fn kind() -> impl Strategy<Value = FieldKind> {
    prop::sample::select(FieldKind::ALL.to_vec())
}

/// Valid `name:Kind[:flag]*` tokens
fn field_token() -> impl Strategy<Value = String> {
    (field_name(), kind()).prop_flat_map(|(name, kind)| {
        let flags: Vec<&'static str> = [
            ModifierName::OptionalOnSave,
            ModifierName::OptionalInStorage,
            ModifierName::Unique,
            ModifierName::Indexed,
        ]
        .into_iter()
        .filter(|m| kind.accepts(*m))
        .map(ModifierName::token)
        .collect();
        let count = flags.len();

        prop::sample::subsequence(flags, 0..=count).prop_map(move |chosen| {
            let mut token = format!("{name}:{}", kind.token());
            if kind.is_relation() {
                token.push_str(":to=Other");
            }
            for flag in chosen {
                token.push(':');
                token.push_str(flag);
            }
            token
        })
    })
}

fn snippets() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(SNIPPETS.to_vec()), 0..6).prop_map(|s| s.concat())
}

/// Module containing exactly one `Blog` class among unrelated code
fn module() -> impl Strategy<Value = String> {
    (snippets(), snippets()).prop_map(|(before, after)| format!("{before}{BLOG}{after}"))
}

fn field_fragment(token: &str) -> ArtifactFragment {
    let field = FieldDescriptor::parse(token).unwrap();
    ArtifactFragment::new(
        ArtifactKind::Definition,
        FragmentTag::FieldDeclaration,
        field.name(),
        Container::ClassBody("Blog".to_string()),
        render_declaration(&field),
    )
}

proptest! {
    #[test]
    fn parse_is_deterministic(token in field_token()) {
        let first = FieldDescriptor::parse(&token).unwrap();
        let second = FieldDescriptor::parse(&token).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(FieldDescriptor::parse(&first.to_string()).unwrap(), first);
    }

    #[test]
    fn foreign_modifiers_are_rejected(kind in kind(), modifier in prop::sample::select(ModifierName::ALL.to_vec())) {
        prop_assume!(!kind.accepts(modifier));
        let segment = if modifier.takes_value() {
            format!("{}=x", modifier.token())
        } else {
            modifier.token().to_string()
        };
        let err = FieldDescriptor::parse(&format!("f:{}:{segment}", kind.token())).unwrap_err();
        let is_incompatible = matches!(err, FieldError::IncompatibleModifier { .. });
        prop_assert!(is_incompatible, "{err}");
    }

    #[test]
    fn unedited_tree_round_trips(source in module()) {
        let tree = PythonAdapter.parse(&source).unwrap();
        prop_assert_eq!(tree.to_source(), source);
    }

    #[test]
    fn merge_is_idempotent(source in module(), token in field_token()) {
        let engine = MergeEngine::python();
        let fragment = field_fragment(&token);

        match engine.merge(&source, &fragment) {
            Ok(once) => {
                let twice = engine.merge(&once.text, &fragment).unwrap();
                prop_assert_eq!(twice.change, Change::Unchanged);
                prop_assert_eq!(&twice.text, &once.text);
                prop_assert!(once.text.starts_with(&source[..source.find(BLOG).unwrap() + BLOG.len()]));
                prop_assert!(PythonAdapter.parse(&once.text).is_ok());
            }
            Err(err) => {
                let is_conflict = matches!(err, MergeError::ConflictingDeclaration { .. });
                prop_assert!(is_conflict, "{err}");
                prop_assert_eq!(fragment.name(), "title");
            }
        }
    }

    #[test]
    fn conflicting_title_is_rejected(source in module()) {
        let fragment = field_fragment("title:LongText");
        let err = MergeEngine::python().merge(&source, &fragment).unwrap_err();
        let is_conflict = matches!(err, MergeError::ConflictingDeclaration { .. });
        prop_assert!(is_conflict);
    }

    #[test]
    fn field_order_is_kept_in_every_artifact(names in prop::collection::hash_set(field_name(), 1..6)) {
        let names: Vec<String> = names.into_iter().collect();
        let config = GeneratorConfig::default();
        let mut builder = EntityBuilder::new("Blog", &config).unwrap();
        for name in &names {
            builder.add_token(&format!("{name}:ShortText")).unwrap();
        }
        let entity = builder.build().unwrap();

        let emitter = TemplateEmitter::new(&config).unwrap();
        let fragments = emitter
            .emit(&entity, &[ArtifactKind::Definition, ArtifactKind::Registration])
            .unwrap();

        let models = emitter.new_file(ArtifactKind::Definition, &fragments).unwrap();
        let positions: Vec<usize> = names
            .iter()
            .map(|name| models.find(&format!("    {name} = ")).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let admin = emitter.new_file(ArtifactKind::Registration, &fragments).unwrap();
        let positions: Vec<usize> = names
            .iter()
            .map(|name| admin.find(&format!("\"{name}\"")).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn every_kind_has_a_valid_modifier_set() {
    for kind in FieldKind::ALL {
        let token = if kind.is_relation() {
            format!("f:{}:to=Other", kind.token())
        } else {
            format!("f:{}", kind.token())
        };
        assert!(FieldDescriptor::parse(&token).is_ok(), "{token}");
    }
}
