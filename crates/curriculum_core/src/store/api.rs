//! REST client contract for the remote curriculum backend.
//!
//! # Responsibility
//! - Map each `Mutation` onto exactly one REST request.
//! - Fetch the fully nested curriculum array.
//!
//! # Invariants
//! - Request bodies carry the ancestor ids of the addressed node.
//! - Catalog edits replace the whole `standards`/`activityTypes` array.

use crate::model::curriculum::{
    Activity, Book, Curriculum, DocumentNode, Grade, Lesson, Stage, Unit,
};
use crate::model::node::{Level, NodeData};
use crate::tree::arena::CurriculumTree;
use crate::tree::mutation::{CatalogKind, Mutation};
use crate::tree::path::NodePath;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Connection, timeout or TLS failure.
    Transport(String),
    /// Non-2xx response.
    Status { code: u16, message: String },
    /// Body could not be encoded or decoded.
    Decode(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "network error: {message}"),
            Self::Status { code, message } if message.is_empty() => {
                write!(f, "server responded with status {code}")
            }
            Self::Status { code, message } => {
                write!(f, "server responded with status {code}: {message}")
            }
            Self::Decode(message) => write!(f, "unexpected response: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One write request against the backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Backend operations used by the remote store.
pub trait CurriculumApi {
    /// `GET /curriculums`: the fully nested tree.
    fn fetch_curricula(&self) -> ApiResult<Vec<Curriculum>>;

    fn send(&self, request: &ApiRequest) -> ApiResult<()>;
}

impl<A: CurriculumApi + ?Sized> CurriculumApi for &A {
    fn fetch_curricula(&self) -> ApiResult<Vec<Curriculum>> {
        (**self).fetch_curricula()
    }

    fn send(&self, request: &ApiRequest) -> ApiResult<()> {
        (**self).send(request)
    }
}

/// Blocking HTTP implementation over `reqwest`.
pub struct HttpCurriculumApi {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpCurriculumApi {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl CurriculumApi for HttpCurriculumApi {
    fn fetch_curricula(&self) -> ApiResult<Vec<Curriculum>> {
        let response = self.client.get(self.url("/curriculums")).send()?;
        let response = ensure_success(response)?;
        let curricula = response.json::<Vec<Curriculum>>()?;
        Ok(curricula)
    }

    fn send(&self, request: &ApiRequest) -> ApiResult<()> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        ensure_success(builder.send()?)?;
        Ok(())
    }
}

fn ensure_success(
    response: reqwest::blocking::Response,
) -> ApiResult<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = body
        .replace(['\n', '\r'], " ")
        .trim()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();
    Err(ApiError::Status {
        code: status.as_u16(),
        message,
    })
}

/// Builds the request that carries `mutation` to the backend.
///
/// Returns `Ok(None)` when the mutation would not change `tree`, so no
/// request should be sent.
pub fn request_for(tree: &CurriculumTree, mutation: &Mutation) -> ApiResult<Option<ApiRequest>> {
    if !tree.accepts(mutation) {
        return Ok(None);
    }

    let request = match mutation {
        Mutation::AddNode {
            parent,
            level,
            data,
        } => {
            let mut body = ancestor_ids(parent);
            merge_object(&mut body, node_json(*level, data.clone())?);
            ApiRequest {
                method: HttpMethod::Post,
                path: format!("/{}", level.collection()),
                query: Vec::new(),
                body: Some(Value::Object(body)),
            }
        }
        Mutation::UpdateNode { path, patch } => {
            let Some((level, id, parent)) = split_leaf(path) else {
                return Ok(None);
            };
            let mut body = ancestor_ids(&parent);
            let mut fields = serde_json::to_value(patch)?;
            if level == Level::Unit {
                if let Some(object) = fields.as_object_mut() {
                    if let Some(duration) = object.remove("duration") {
                        object.insert("totalTime".to_string(), duration);
                    }
                }
            }
            merge_object(&mut body, fields);
            ApiRequest {
                method: HttpMethod::Put,
                path: format!("/{}/{id}", level.collection()),
                query: Vec::new(),
                body: Some(Value::Object(body)),
            }
        }
        Mutation::DeleteNode { path } => {
            let Some((level, id, parent)) = split_leaf(path) else {
                return Ok(None);
            };
            let query = parent
                .segments()
                .iter()
                .map(|segment| (segment.level.id_key().to_string(), segment.id.clone()))
                .collect();
            ApiRequest {
                method: HttpMethod::Delete,
                path: format!("/{}/{id}", level.collection()),
                query,
                body: None,
            }
        }
        Mutation::Catalog {
            curriculum_id,
            change,
        } => {
            let Some(mut catalog) = tree.catalog(curriculum_id).cloned() else {
                return Ok(None);
            };
            if catalog.apply(change).is_ignored() {
                return Ok(None);
            }
            let mut body = Map::new();
            match change.kind() {
                CatalogKind::Standards => {
                    body.insert(
                        "standards".to_string(),
                        serde_json::to_value(&catalog.standards)?,
                    );
                }
                CatalogKind::ActivityTypes => {
                    body.insert(
                        "activityTypes".to_string(),
                        serde_json::to_value(&catalog.activity_types)?,
                    );
                }
            }
            ApiRequest {
                method: HttpMethod::Put,
                path: format!("/{}/{curriculum_id}", Level::Curriculum.collection()),
                query: Vec::new(),
                body: Some(Value::Object(body)),
            }
        }
        Mutation::Import { curricula } => ApiRequest {
            method: HttpMethod::Post,
            path: "/curriculum/upload".to_string(),
            query: Vec::new(),
            body: Some(serde_json::to_value(curricula)?),
        },
    };
    Ok(Some(request))
}

fn split_leaf(path: &NodePath) -> Option<(Level, String, NodePath)> {
    let leaf = path.leaf()?;
    Some((leaf.level, leaf.id.clone(), path.parent()?))
}

fn ancestor_ids(path: &NodePath) -> Map<String, Value> {
    path.segments()
        .iter()
        .map(|segment| {
            (
                segment.level.id_key().to_string(),
                Value::String(segment.id.clone()),
            )
        })
        .collect()
}

fn merge_object(target: &mut Map<String, Value>, value: Value) {
    if let Value::Object(fields) = value {
        target.extend(fields);
    }
}

fn node_json(level: Level, data: NodeData) -> ApiResult<Value> {
    let value = match level {
        Level::Curriculum => serde_json::to_value(Curriculum::from_parts(data, Vec::new())),
        Level::Grade => serde_json::to_value(Grade::from_parts(data, Vec::new())),
        Level::Book => serde_json::to_value(Book::from_parts(data, Vec::new())),
        Level::Unit => serde_json::to_value(Unit::from_parts(data, Vec::new())),
        Level::Lesson => serde_json::to_value(Lesson::from_parts(data, Vec::new())),
        Level::Stage => serde_json::to_value(Stage::from_parts(data, Vec::new())),
        Level::Activity => serde_json::to_value(Activity::from_parts(data, Vec::new())),
    }?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{request_for, HttpMethod};
    use crate::model::curriculum::Standard;
    use crate::model::node::{Level, NodeData, NodePatch};
    use crate::tree::arena::CurriculumTree;
    use crate::tree::mutation::{CatalogChange, Mutation};
    use crate::tree::path::NodePath;
    use serde_json::json;

    fn node(id: &str, name: &str) -> NodeData {
        NodeData {
            id: id.to_string(),
            name: name.to_string(),
            ..NodeData::default()
        }
    }

    fn tree_with_unit() -> CurriculumTree {
        let mut tree = CurriculumTree::new();
        tree.insert(&NodePath::root(), Level::Curriculum, node("c1", "Math"))
            .unwrap();
        let grade = NodePath::curriculum("c1").grade("g1");
        tree.insert(&NodePath::curriculum("c1"), Level::Grade, node("g1", "G1"))
            .unwrap();
        tree.insert(&grade, Level::Book, node("b1", "B1")).unwrap();
        tree.insert(&grade.clone().book("b1"), Level::Unit, node("u1", "U1"))
            .unwrap();
        tree
    }

    #[test]
    fn add_posts_ancestor_ids_with_node() {
        let tree = tree_with_unit();
        let mutation = Mutation::AddNode {
            parent: NodePath::curriculum("c1").grade("g1"),
            level: Level::Book,
            data: node("b2", "B2"),
        };
        let request = request_for(&tree, &mutation).unwrap().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.path, "/books");
        let body = request.body.unwrap();
        assert_eq!(body["curriculumId"], json!("c1"));
        assert_eq!(body["gradeId"], json!("g1"));
        assert_eq!(body["id"], json!("b2"));
        assert_eq!(body["name"], json!("B2"));
    }

    #[test]
    fn unit_duration_update_uses_total_time() {
        let tree = tree_with_unit();
        let path = NodePath::curriculum("c1").grade("g1").book("b1").unit("u1");
        let mutation = Mutation::UpdateNode {
            path,
            patch: NodePatch::duration(Some("2 Weeks".to_string())),
        };
        let request = request_for(&tree, &mutation).unwrap().unwrap();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path, "/units/u1");
        let body = request.body.unwrap();
        assert_eq!(body["totalTime"], json!("2 Weeks"));
        assert_eq!(body["bookId"], json!("b1"));
        assert!(body.get("duration").is_none());
        assert!(body.get("name").is_none());
    }

    #[test]
    fn delete_sends_ancestors_as_query() {
        let tree = tree_with_unit();
        let mutation = Mutation::DeleteNode {
            path: NodePath::curriculum("c1").grade("g1").book("b1"),
        };
        let request = request_for(&tree, &mutation).unwrap().unwrap();
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.path, "/books/b1");
        assert_eq!(
            request.query,
            vec![
                ("curriculumId".to_string(), "c1".to_string()),
                ("gradeId".to_string(), "g1".to_string()),
            ]
        );
        assert!(request.body.is_none());
    }

    #[test]
    fn catalog_change_replaces_whole_array() {
        let tree = tree_with_unit();
        let mutation = Mutation::Catalog {
            curriculum_id: "c1".to_string(),
            change: CatalogChange::AddStandard(Standard {
                id: "s1".to_string(),
                name: "ISTE".to_string(),
                description: None,
                codes: Vec::new(),
            }),
        };
        let request = request_for(&tree, &mutation).unwrap().unwrap();
        assert_eq!(request.path, "/curriculums/c1");
        let body = request.body.unwrap();
        assert_eq!(body["standards"][0]["id"], json!("s1"));
        assert!(body.get("activityTypes").is_none());
    }

    #[test]
    fn unresolved_path_builds_no_request() {
        let tree = tree_with_unit();
        let mutation = Mutation::DeleteNode {
            path: NodePath::curriculum("c1").grade("missing"),
        };
        assert!(request_for(&tree, &mutation).unwrap().is_none());
    }
}
