//! Integration tests for relation inference

use erdviz_core::{DatabaseModel, RelationType, TableType};
use erdviz_engine::{InferenceConfig, InferenceSummary, RelationInferenceEngine};
use erdviz_sql::CompositeSqlParser;
use pretty_assertions::assert_eq;

fn parse(sql: &str) -> DatabaseModel {
    let result = CompositeSqlParser::new().parse(sql, "mysql");
    assert!(result.success, "{}: {:?}", result.message, result.errors);
    result.database_model.unwrap()
}

fn relation(model: &DatabaseModel, table: &str, fk_index: usize) -> Option<RelationType> {
    model.find_table(table).unwrap().foreign_keys[fk_index].relation_type
}

const BLOG_SQL: &str = "
CREATE TABLE users (
    id BIGINT PRIMARY KEY AUTO_INCREMENT,
    username VARCHAR(50) NOT NULL
);

CREATE TABLE profiles (
    user_id BIGINT PRIMARY KEY,
    bio TEXT,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE posts (
    id BIGINT PRIMARY KEY AUTO_INCREMENT,
    user_id BIGINT NOT NULL,
    title VARCHAR(200),
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE tags (
    id INT PRIMARY KEY,
    name VARCHAR(30)
);

CREATE TABLE post_tags (
    post_id BIGINT,
    tag_id INT,
    PRIMARY KEY (post_id, tag_id),
    FOREIGN KEY (post_id) REFERENCES posts(id),
    FOREIGN KEY (tag_id) REFERENCES tags(id)
);
";

#[test]
fn classifies_blog_schema() {
    let mut model = parse(BLOG_SQL);
    let summary = RelationInferenceEngine::default().infer_relations(&mut model);

    assert_eq!(relation(&model, "profiles", 0), Some(RelationType::OneToOne));
    assert_eq!(relation(&model, "posts", 0), Some(RelationType::OneToMany));
    assert_eq!(relation(&model, "post_tags", 0), Some(RelationType::ManyToMany));
    assert_eq!(relation(&model, "post_tags", 1), Some(RelationType::ManyToMany));

    let post_tags = model.find_table("post_tags").unwrap();
    assert_eq!(post_tags.table_type, Some(TableType::Junction));
    assert_eq!(
        model.find_table("posts").unwrap().table_type,
        Some(TableType::BaseTable)
    );

    assert_eq!(
        summary,
        InferenceSummary {
            one_to_one: 1,
            one_to_many: 1,
            many_to_many: 2,
            junction_tables: 1,
            implicit_foreign_keys: 0,
        }
    );
}

#[test]
fn inference_is_idempotent() {
    let mut model = parse(BLOG_SQL);
    let engine = RelationInferenceEngine::default();

    let first = engine.infer_relations(&mut model);
    let snapshot = model.clone();
    let second = engine.infer_relations(&mut model);

    assert_eq!(model, snapshot);
    assert_eq!(first, second);
}

#[test]
fn junction_detection_can_be_disabled() {
    let mut model = parse(BLOG_SQL);
    let config = InferenceConfig {
        identify_junction_tables: false,
        ..InferenceConfig::default()
    };
    RelationInferenceEngine::new(config).infer_relations(&mut model);

    let post_tags = model.find_table("post_tags").unwrap();
    assert!(!post_tags.is_junction());
    assert_eq!(relation(&model, "post_tags", 0), Some(RelationType::OneToMany));
}

#[test]
fn extra_foreign_key_prevents_junction() {
    let mut model = parse(
        "CREATE TABLE a (id INT PRIMARY KEY);
         CREATE TABLE b (id INT PRIMARY KEY);
         CREATE TABLE c (id INT PRIMARY KEY);
         CREATE TABLE abc (
             a_id INT,
             b_id INT,
             c_id INT,
             PRIMARY KEY (a_id, b_id),
             FOREIGN KEY (a_id) REFERENCES a(id),
             FOREIGN KEY (b_id) REFERENCES b(id),
             FOREIGN KEY (c_id) REFERENCES c(id)
         );",
    );
    RelationInferenceEngine::default().infer_relations(&mut model);

    let abc = model.find_table("abc").unwrap();
    assert!(!abc.is_junction());
    assert!(abc
        .foreign_keys
        .iter()
        .all(|fk| fk.relation_type == Some(RelationType::OneToMany)));
}

#[test]
fn two_foreign_keys_not_covering_pk_is_not_junction() {
    let mut model = parse(
        "CREATE TABLE a (id INT PRIMARY KEY);
         CREATE TABLE b (id INT PRIMARY KEY);
         CREATE TABLE ab (
             id INT PRIMARY KEY,
             a_id INT,
             b_id INT,
             FOREIGN KEY (a_id) REFERENCES a(id),
             FOREIGN KEY (b_id) REFERENCES b(id)
         );",
    );
    RelationInferenceEngine::default().infer_relations(&mut model);

    assert!(!model.find_table("ab").unwrap().is_junction());
    assert_eq!(relation(&model, "ab", 0), Some(RelationType::OneToMany));
}

#[test]
fn naming_convention_adds_implicit_foreign_keys() {
    let mut model = parse(
        "CREATE TABLE users (id INT PRIMARY KEY);
         CREATE TABLE category (id INT PRIMARY KEY);
         CREATE TABLE articles (
             id INT PRIMARY KEY,
             user_id INT,
             category_id INT,
             editor_id INT
         );",
    );
    let config = InferenceConfig {
        enable_naming_convention: true,
        ..InferenceConfig::default()
    };
    let engine = RelationInferenceEngine::new(config);

    let summary = engine.infer_relations(&mut model);
    assert_eq!(summary.implicit_foreign_keys, 2);

    let articles = model.find_table("articles").unwrap();
    let targets: Vec<(&str, Option<&str>)> = articles
        .foreign_keys
        .iter()
        .map(|fk| (fk.to_table.as_str(), fk.name.as_deref()))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("users", Some("fk_articles_user_id")),
            ("category", Some("fk_articles_category_id")),
        ]
    );

    let again = engine.infer_relations(&mut model);
    assert_eq!(again.implicit_foreign_keys, 0);
    assert_eq!(model.find_table("articles").unwrap().foreign_keys.len(), 2);
}

#[test]
fn naming_convention_is_off_by_default() {
    let mut model = parse(
        "CREATE TABLE users (id INT PRIMARY KEY);
         CREATE TABLE articles (id INT PRIMARY KEY, user_id INT);",
    );
    RelationInferenceEngine::default().infer_relations(&mut model);
    assert_eq!(model.foreign_key_count(), 0);
}
