//! Wire Format
//!
//! Raw backend shapes and their conversion into domain entities. The backend
//! may wrap any payload in `{ "data": ... }`, identifies entities by `_id`,
//! `id` or both, and sends references either as bare ids or as populated
//! objects. All of that is resolved here and nowhere else.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Board, BoardId, Card, CardId, Comment, CommentId, Member, MemberId, Orderable, Stage, StageId, Workspace,
    WorkspaceId, DEFAULT_BOARD_COLOR,
};
use crate::error::{ApiError, ApiResult};

// ========================
// Envelopes & References
// ========================

/// Optional `{ "data": ... }` wrapper
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// Pick the canonical identifier; `_id` wins when both are present
fn pick_id(mongo_id: Option<String>, id: Option<String>, entity: &'static str) -> ApiResult<String> {
    mongo_id
        .into_iter()
        .chain(id)
        .find(|value| !value.is_empty())
        .ok_or(ApiError::MissingId { entity })
}

/// A reference that is either a bare id or a populated object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawRef {
    Id(String),
    Object(RawMember),
}

impl RawRef {
    fn into_id(self, entity: &'static str) -> ApiResult<String> {
        match self {
            RawRef::Id(id) if !id.is_empty() => Ok(id),
            RawRef::Id(_) => Err(ApiError::MissingId { entity }),
            RawRef::Object(raw) => pick_id(raw.mongo_id, raw.id, entity),
        }
    }

    fn into_member(self) -> ApiResult<Member> {
        match self {
            RawRef::Object(raw) => raw.into_member(),
            id => Ok(Member {
                id: MemberId::new(id.into_id("member")?),
                name: None,
                email: None,
            }),
        }
    }
}

// ========================
// Raw Entities
// ========================

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawMember {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

impl RawMember {
    pub(crate) fn into_member(self) -> ApiResult<Member> {
        Ok(Member {
            id: MemberId::new(pick_id(self.mongo_id, self.id, "member")?),
            name: self.name,
            email: self.email,
        })
    }
}

/// `/auth/me` answers either with the user or with `{ "user": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserPayload {
    Nested { user: RawMember },
    Flat(RawMember),
}

impl UserPayload {
    pub(crate) fn into_member(self) -> ApiResult<Member> {
        match self {
            UserPayload::Nested { user } | UserPayload::Flat(user) => user.into_member(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawWorkspace {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    name: String,
    description: Option<String>,
}

impl RawWorkspace {
    pub(crate) fn into_workspace(self) -> ApiResult<Workspace> {
        Ok(Workspace {
            id: WorkspaceId::new(pick_id(self.mongo_id, self.id, "workspace")?),
            name: self.name,
            description: self.description,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawBoard {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    name: String,
    background_color: Option<String>,
    #[serde(alias = "workspace")]
    workspace_id: Option<RawRef>,
}

impl RawBoard {
    pub(crate) fn into_board(self) -> ApiResult<Board> {
        let workspace_id = match self.workspace_id {
            Some(raw) => Some(WorkspaceId::new(raw.into_id("workspace")?)),
            None => None,
        };
        Ok(Board {
            id: BoardId::new(pick_id(self.mongo_id, self.id, "board")?),
            name: self.name,
            background_color: self
                .background_color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_BOARD_COLOR.to_string()),
            workspace_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawStage {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(alias = "board")]
    board_id: Option<RawRef>,
    /// Integer or fractional ordinal; absent sorts first
    #[serde(default)]
    position: f64,
}

impl RawStage {
    pub(crate) fn ordinal(&self) -> f64 {
        self.position
    }

    /// `board` fills in a missing owner when the request already named it
    pub(crate) fn into_stage(self, board: Option<&BoardId>) -> ApiResult<Stage> {
        let board_id = match (self.board_id, board) {
            (Some(raw), _) => BoardId::new(raw.into_id("stage board")?),
            (None, Some(board)) => board.clone(),
            (None, None) => return Err(ApiError::MissingId { entity: "stage board" }),
        };
        Ok(Stage {
            id: StageId::new(pick_id(self.mongo_id, self.id, "stage")?),
            name: self.name,
            board_id,
            position: provisional_position(self.position),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCard {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(default)]
    title: String,
    description: Option<String>,
    labels: Option<Vec<String>>,
    /// Older cards carry a single priority instead of labels
    priority: Option<String>,
    due_date: Option<DateTime<Utc>>,
    assigned_to: Option<Vec<RawRef>>,
    #[serde(alias = "stage")]
    stage_id: Option<RawRef>,
    #[serde(default)]
    position: f64,
    created_by: Option<RawRef>,
    created_at: Option<DateTime<Utc>>,
}

impl RawCard {
    pub(crate) fn ordinal(&self) -> f64 {
        self.position
    }

    /// `stage` fills in a missing owner when the request already named it
    pub(crate) fn into_card(self, stage: Option<&StageId>) -> ApiResult<Card> {
        let stage_id = match (self.stage_id, stage) {
            (Some(raw), _) => StageId::new(raw.into_id("card stage")?),
            (None, Some(stage)) => stage.clone(),
            (None, None) => return Err(ApiError::MissingId { entity: "card stage" }),
        };

        let mut labels: BTreeSet<String> = self.labels.unwrap_or_default().into_iter().collect();
        if labels.is_empty() {
            labels.extend(self.priority.filter(|p| !p.is_empty()));
        }

        let assigned_to: BTreeSet<MemberId> = self
            .assigned_to
            .unwrap_or_default()
            .into_iter()
            .map(|raw| raw.into_id("assignee").map(MemberId::new))
            .collect::<ApiResult<_>>()?;

        let created_by = match self.created_by {
            Some(raw) => Some(raw.into_member()?),
            None => None,
        };

        Ok(Card {
            id: CardId::new(pick_id(self.mongo_id, self.id, "card")?),
            title: self.title,
            description: self.description.unwrap_or_default(),
            labels,
            due_date: self.due_date,
            assigned_to,
            stage_id,
            position: provisional_position(self.position),
            created_by,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawComment {
    #[serde(rename = "_id")]
    mongo_id: Option<String>,
    id: Option<String>,
    #[serde(alias = "card")]
    card_id: Option<RawRef>,
    #[serde(default)]
    content: String,
    #[serde(alias = "user", alias = "createdBy")]
    user_id: Option<RawRef>,
    created_at: Option<DateTime<Utc>>,
}

impl RawComment {
    pub(crate) fn into_comment(self, card: Option<&CardId>) -> ApiResult<Comment> {
        let card_id = match (self.card_id, card) {
            (Some(raw), _) => CardId::new(raw.into_id("comment card")?),
            (None, Some(card)) => card.clone(),
            (None, None) => return Err(ApiError::MissingId { entity: "comment card" }),
        };
        let author = self
            .user_id
            .ok_or(ApiError::MissingId { entity: "comment author" })?
            .into_member()?;

        Ok(Comment {
            id: CommentId::new(pick_id(self.mongo_id, self.id, "comment")?),
            card_id,
            author,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

// ========================
// Positions
// ========================

/// Nearest integer rank until [`dense_positions`] assigns the real one
fn provisional_position(ordinal: f64) -> i32 {
    ordinal.round() as i32
}

/// Order entities by their server ordinal (ties by id) and give them dense
/// zero-based positions within each parent.
pub(crate) fn dense_positions<T: Orderable>(mut ranked: Vec<(f64, T)>) -> Vec<T> {
    ranked.sort_by(|(a, x), (b, y)| a.total_cmp(b).then_with(|| x.id().cmp(y.id())));

    let mut next: HashMap<T::Parent, i32> = HashMap::new();
    ranked
        .into_iter()
        .map(|(_, mut entity)| {
            let slot = next.entry(entity.parent().clone()).or_insert(0);
            entity.set_position(*slot);
            *slot += 1;
            entity
        })
        .collect()
}

// ========================
// Requests
// ========================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOrder {
    pub stage_id: StageId,
    pub position: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReorderStagesRequest<'a> {
    pub stage_orders: &'a [StageOrder],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoveCardRequest<'a> {
    pub target_stage_id: &'a StageId,
    pub target_position: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateStageRequest<'a> {
    pub board_id: &'a BoardId,
    pub name: &'a str,
    pub position: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCommentRequest<'a> {
    pub card_id: &'a CardId,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateCommentRequest<'a> {
    pub content: &'a str,
}

/// Human-readable message out of an error body
pub(crate) fn error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(parsed) => parsed.message.or(parsed.error),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value::<Envelope<T>>(value).unwrap().into_inner()
    }

    #[test]
    fn test_envelope_wrapped_and_bare() {
        let wrapped: Vec<RawWorkspace> = decode(json!({ "success": true, "data": [{ "_id": "w1", "name": "Team" }] }));
        let bare: Vec<RawWorkspace> = decode(json!([{ "id": "w1", "name": "Team" }]));

        let a = wrapped.into_iter().next().unwrap().into_workspace().unwrap();
        let b = bare.into_iter().next().unwrap().into_workspace().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id.as_str(), "w1");
    }

    #[test]
    fn test_underscore_id_wins_and_missing_id_fails() {
        let both: RawStage = decode(json!({ "_id": "mongo", "id": "plain", "name": "Doing", "position": 1 }));
        let board = BoardId::new("b1");
        let stage = both.into_stage(Some(&board)).unwrap();
        assert_eq!(stage.id.as_str(), "mongo");
        assert_eq!(stage.board_id, board);

        let none: RawStage = decode(json!({ "name": "Doing" }));
        assert_eq!(
            none.into_stage(Some(&board)).unwrap_err(),
            ApiError::MissingId { entity: "stage" }
        );
    }

    #[test]
    fn test_fractional_and_missing_positions() {
        let board = BoardId::new("b1");
        let raw: Vec<RawStage> = decode(json!({ "data": [
            { "_id": "s3", "name": "Done", "position": 2 },
            { "_id": "s2", "name": "Doing", "position": 1.5 },
            { "_id": "s1", "name": "Backlog" },
            { "_id": "s0", "name": "Inbox", "position": 0 }
        ]}));

        let ranked = raw
            .into_iter()
            .map(|s| Ok((s.ordinal(), s.into_stage(Some(&board))?)))
            .collect::<ApiResult<Vec<_>>>()
            .unwrap();
        let stages = dense_positions(ranked);

        let order: Vec<(&str, i32)> = stages.iter().map(|s| (s.id.as_str(), s.position)).collect();
        // missing position ties with 0 and falls back to the id
        assert_eq!(order, vec![("s0", 0), ("s1", 1), ("s2", 2), ("s3", 3)]);
    }

    #[test]
    fn test_dense_positions_count_per_stage() {
        let raw: Vec<RawCard> = decode(json!([
            { "_id": "c1", "title": "a", "stageId": "todo", "position": 0.25 },
            { "_id": "c2", "title": "b", "stageId": "done", "position": 0.5 },
            { "_id": "c3", "title": "c", "stageId": "todo", "position": 7 }
        ]));
        let ranked = raw
            .into_iter()
            .map(|c| Ok((c.ordinal(), c.into_card(None)?)))
            .collect::<ApiResult<Vec<_>>>()
            .unwrap();

        let cards = dense_positions(ranked);
        let placed: Vec<(&str, &str, i32)> = cards
            .iter()
            .map(|c| (c.id.as_str(), c.stage_id.as_str(), c.position))
            .collect();
        assert_eq!(placed, vec![("c1", "todo", 0), ("c2", "done", 0), ("c3", "todo", 1)]);
    }

    #[test]
    fn test_card_references_populated_or_bare() {
        let raw: RawCard = decode(json!({
            "data": {
                "_id": "c1",
                "title": "Ship it",
                "description": null,
                "labels": ["Bug", "Bug", "UI"],
                "dueDate": "2024-06-10T08:00:00Z",
                "assignedTo": ["u1", { "_id": "u2", "name": "Bea" }],
                "stageId": { "id": "s1", "name": "Doing" },
                "position": 4,
                "createdBy": { "_id": "u1", "email": "ann@x.io" }
            }
        }));
        let card = raw.into_card(None).unwrap();

        assert_eq!(card.stage_id.as_str(), "s1");
        assert_eq!(card.labels.len(), 2);
        assert_eq!(
            card.assigned_to.iter().map(MemberId::as_str).collect::<Vec<_>>(),
            vec!["u1", "u2"]
        );
        assert_eq!(card.created_by.unwrap().display_name(), "ann");
        assert_eq!(card.description, "");
        assert!(card.due_date.is_some());
    }

    #[test]
    fn test_card_priority_fallback_and_stage_from_request() {
        let raw: RawCard = decode(json!({ "id": "c2", "title": "Old", "priority": "High" }));
        let card = raw.into_card(Some(&StageId::new("s9"))).unwrap();
        assert_eq!(card.stage_id.as_str(), "s9");
        assert!(card.labels.contains("High"));
    }

    #[test]
    fn test_board_color_default() {
        let raw: RawBoard = decode(json!({ "_id": "b1", "name": "Roadmap", "backgroundColor": "" }));
        assert_eq!(raw.into_board().unwrap().background_color, DEFAULT_BOARD_COLOR);
    }

    #[test]
    fn test_comment_author_aliases() {
        let raw: RawComment = decode(json!({ "_id": "k1", "content": "hi", "user": { "id": "u7", "name": "Kim" } }));
        let comment = raw.into_comment(Some(&CardId::new("c1"))).unwrap();
        assert_eq!(comment.author.id.as_str(), "u7");
        assert_eq!(comment.card_id.as_str(), "c1");
    }

    #[test]
    fn test_user_payload_nested_or_flat() {
        let nested: UserPayload = decode(json!({ "data": { "user": { "_id": "u1", "name": "Ann" } } }));
        let flat: UserPayload = decode(json!({ "data": { "_id": "u1", "name": "Ann" } }));
        assert_eq!(nested.into_member().unwrap(), flat.into_member().unwrap());
    }

    #[test]
    fn test_request_shapes() {
        let orders = [StageOrder {
            stage_id: StageId::new("s1"),
            position: 0,
        }];
        let body = serde_json::to_value(ReorderStagesRequest { stage_orders: &orders }).unwrap();
        assert_eq!(body, json!({ "stageOrders": [{ "stageId": "s1", "position": 0 }] }));

        let stage = StageId::new("s2");
        let body = serde_json::to_value(MoveCardRequest {
            target_stage_id: &stage,
            target_position: 3,
        })
        .unwrap();
        assert_eq!(body, json!({ "targetStageId": "s2", "targetPosition": 3 }));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message":"Stage not found"}"#).as_deref(), Some("Stage not found"));
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert_eq!(error_message("  "), None);
    }
}
