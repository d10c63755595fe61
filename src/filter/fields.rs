//! Field catalogs: the finite set of public field names each entity listing
//! accepts, and how every one of them maps onto SQL.

use super::types::OperatorSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Boolean,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A column of the entity table itself.
    Column { column: &'static str, ty: ColumnType },
    /// A column of the entity's localized text table.
    Localized { column: &'static str },
    /// Membership in a join table; filter values are ids of the other side.
    Relation {
        table: &'static str,
        owner_key: &'static str,
        target_key: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextTable {
    pub table: &'static str,
    pub owner_key: &'static str,
}

#[derive(Debug)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub table: &'static str,
    pub primary_key: &'static str,
    pub operators: OperatorSet,
    pub texts: Option<TextTable>,
    /// Sort column used when the request names none (before the key tie-breaker).
    pub default_sort: Option<&'static str>,
    pub fields: &'static [Field],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const fn text(name: &'static str) -> Field {
    Field { name, kind: FieldKind::Column { column: name, ty: ColumnType::Text } }
}

const fn integer(name: &'static str) -> Field {
    Field { name, kind: FieldKind::Column { column: name, ty: ColumnType::Integer } }
}

const fn boolean(name: &'static str) -> Field {
    Field { name, kind: FieldKind::Column { column: name, ty: ColumnType::Boolean } }
}

const fn timestamp(name: &'static str) -> Field {
    Field { name, kind: FieldKind::Column { column: name, ty: ColumnType::Timestamp } }
}

const fn localized(name: &'static str) -> Field {
    Field { name, kind: FieldKind::Localized { column: name } }
}

const fn relation(name: &'static str, table: &'static str, owner_key: &'static str, target_key: &'static str) -> Field {
    Field { name, kind: FieldKind::Relation { table, owner_key, target_key } }
}

macro_rules! audit_fields {
    () => {
        [timestamp("created_at"), timestamp("updated_at"), integer("created_by"), integer("updated_by")]
    };
}

const fn concat<const A: usize, const B: usize, const N: usize>(a: [Field; A], b: [Field; B]) -> [Field; N] {
    assert!(A + B == N);
    let mut out = [a[0]; N];
    let mut i = 0;
    while i < A {
        out[i] = a[i];
        i += 1;
    }
    let mut j = 0;
    while j < B {
        out[A + j] = b[j];
        j += 1;
    }
    out
}

pub const SECTION_TEXTS: TextTable = TextTable { table: "section_texts", owner_key: "section_id" };
pub const EXPERIENCE_TEXTS: TextTable = TextTable { table: "experience_texts", owner_key: "experience_id" };
pub const CATEGORY_TEXTS: TextTable = TextTable { table: "category_texts", owner_key: "category_id" };
pub const SKILL_TEXTS: TextTable = TextTable { table: "skill_texts", owner_key: "skill_id" };
pub const PROJECT_TEXTS: TextTable = TextTable { table: "project_texts", owner_key: "project_id" };

const LANGUAGE_FIELDS: [Field; 9] = concat(
    [integer("id"), text("code"), text("name"), text("image"), boolean("is_default")],
    audit_fields!(),
);

pub static LANGUAGES: EntitySchema = EntitySchema {
    entity: "language",
    table: "languages",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: None,
    default_sort: None,
    fields: &LANGUAGE_FIELDS,
};

const TRANSLATION_FIELDS: [Field; 9] = concat(
    [
        integer("id"),
        text("identifier"),
        text("text"),
        relation("language", "translation_languages", "translation_id", "language_id"),
        relation("languages", "translation_languages", "translation_id", "language_id"),
    ],
    audit_fields!(),
);

pub static TRANSLATIONS: EntitySchema = EntitySchema {
    entity: "translation",
    table: "translations",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: None,
    default_sort: None,
    fields: &TRANSLATION_FIELDS,
};

const SECTION_FIELDS: [Field; 9] = concat(
    [
        integer("id"),
        text("code"),
        localized("text"),
        relation("language", "section_texts", "section_id", "language_id"),
        relation("languages", "section_texts", "section_id", "language_id"),
    ],
    audit_fields!(),
);

pub static SECTIONS: EntitySchema = EntitySchema {
    entity: "section",
    table: "sections",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: Some(SECTION_TEXTS),
    default_sort: None,
    fields: &SECTION_FIELDS,
};

const EXPERIENCE_FIELDS: [Field; 9] = concat(
    [integer("id"), text("code"), integer("years"), localized("name"), localized("description")],
    audit_fields!(),
);

pub static EXPERIENCES: EntitySchema = EntitySchema {
    entity: "experience",
    table: "experiences",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: Some(EXPERIENCE_TEXTS),
    default_sort: None,
    fields: &EXPERIENCE_FIELDS,
};

const CATEGORY_FIELDS: [Field; 11] = concat(
    [
        integer("id"),
        text("code"),
        text("type"),
        localized("name"),
        localized("description"),
        relation("skill", "category_skills", "category_id", "skill_id"),
        relation("skills", "category_skills", "category_id", "skill_id"),
    ],
    audit_fields!(),
);

pub static CATEGORIES: EntitySchema = EntitySchema {
    entity: "category",
    table: "categories",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: Some(CATEGORY_TEXTS),
    default_sort: None,
    fields: &CATEGORY_FIELDS,
};

const CATEGORY_TYPE_FIELDS: [Field; 6] = concat([text("code"), text("name")], audit_fields!());

pub static CATEGORY_TYPES: EntitySchema = EntitySchema {
    entity: "category type",
    table: "category_types",
    primary_key: "code",
    operators: OperatorSet::Basic,
    texts: None,
    default_sort: Some("code"),
    fields: &CATEGORY_TYPE_FIELDS,
};

const SKILL_FIELDS: [Field; 10] = concat(
    [
        integer("id"),
        text("type"),
        localized("name"),
        localized("description"),
        relation("category", "category_skills", "skill_id", "category_id"),
        relation("categories", "category_skills", "skill_id", "category_id"),
    ],
    audit_fields!(),
);

pub static SKILLS: EntitySchema = EntitySchema {
    entity: "skill",
    table: "skills",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: Some(SKILL_TEXTS),
    default_sort: None,
    fields: &SKILL_FIELDS,
};

const PROJECT_FIELDS: [Field; 13] = concat(
    [
        integer("id"),
        text("repository_url"),
        text("website_url"),
        localized("name"),
        localized("description"),
        relation("category", "project_categories", "project_id", "category_id"),
        relation("categories", "project_categories", "project_id", "category_id"),
        relation("skill", "project_skills", "project_id", "skill_id"),
        relation("skills", "project_skills", "project_id", "skill_id"),
    ],
    audit_fields!(),
);

pub static PROJECTS: EntitySchema = EntitySchema {
    entity: "project",
    table: "projects",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: Some(PROJECT_TEXTS),
    default_sort: None,
    fields: &PROJECT_FIELDS,
};

const PORTFOLIO_FIELDS: [Field; 7] = concat([integer("id"), text("name"), text("description")], audit_fields!());

pub static PORTFOLIOS: EntitySchema = EntitySchema {
    entity: "portfolio",
    table: "portfolios",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: None,
    default_sort: None,
    fields: &PORTFOLIO_FIELDS,
};

const USER_FIELDS: [Field; 10] = concat(
    [
        integer("id"),
        text("username"),
        text("email"),
        boolean("is_active"),
        relation("role", "user_roles", "user_id", "role_id"),
        relation("roles", "user_roles", "user_id", "role_id"),
    ],
    audit_fields!(),
);

pub static USERS: EntitySchema = EntitySchema {
    entity: "user",
    table: "users",
    primary_key: "id",
    operators: OperatorSet::Basic,
    texts: None,
    default_sort: None,
    fields: &USER_FIELDS,
};

const ROLE_FIELDS: [Field; 5] = [
    integer("id"),
    text("name"),
    text("description"),
    relation("permission", "role_permissions", "role_id", "permission_id"),
    relation("permissions", "role_permissions", "role_id", "permission_id"),
];

pub static ROLES: EntitySchema = EntitySchema {
    entity: "role",
    table: "roles",
    primary_key: "id",
    operators: OperatorSet::Extended,
    texts: None,
    default_sort: None,
    fields: &ROLE_FIELDS,
};

const PERMISSION_FIELDS: [Field; 3] = [integer("id"), text("name"), text("description")];

pub static PERMISSIONS: EntitySchema = EntitySchema {
    entity: "permission",
    table: "permissions",
    primary_key: "id",
    operators: OperatorSet::Extended,
    texts: None,
    default_sort: None,
    fields: &PERMISSION_FIELDS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_include_audit_columns() {
        for schema in [&LANGUAGES, &SECTIONS, &PROJECTS, &CATEGORY_TYPES, &USERS] {
            assert!(schema.field("created_at").is_some(), "{} lacks created_at", schema.entity);
            assert!(schema.field("updated_by").is_some(), "{} lacks updated_by", schema.entity);
        }
    }

    #[test]
    fn localized_entities_declare_text_tables() {
        for schema in [&SECTIONS, &EXPERIENCES, &CATEGORIES, &SKILLS, &PROJECTS] {
            let has_localized = schema.fields.iter().any(|f| matches!(f.kind, FieldKind::Localized { .. }));
            assert!(has_localized);
            assert!(schema.texts.is_some(), "{} has localized fields but no text table", schema.entity);
        }
    }

    #[test]
    fn relation_aliases_share_join_table() {
        assert_eq!(PROJECTS.field("skill").map(|f| f.kind), PROJECTS.field("skills").map(|f| f.kind));
        assert!(PROJECTS.field("hasattr").is_none());
        assert!(PERMISSIONS.field("created_at").is_none());
    }
}
