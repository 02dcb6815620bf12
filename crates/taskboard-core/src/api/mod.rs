//! Remote API Client
//!
//! Thin `reqwest` wrapper over the board backend. Every response passes
//! through [`wire`] so callers only ever see normalized domain entities.

mod sink;
mod wire;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::domain::{Board, BoardId, Card, CardId, Comment, CommentId, Member, Stage, StageId, Workspace, WorkspaceId};
use crate::error::{ApiError, ApiResult};
use crate::session::UserSource;

use wire::{
    CreateCommentRequest, CreateStageRequest, Envelope, MoveCardRequest, RawBoard, RawCard, RawComment, RawStage,
    RawWorkspace, ReorderStagesRequest, UpdateCommentRequest, UserPayload,
};

pub use sink::{CardSink, ReorderApi, StageSink};
pub use wire::StageOrder;

/// Handle to the board backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: None,
        }
    }

    /// Same client, authenticating with `token`
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========================
    // Plumbing
    // ========================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, self.config.endpoint(path));
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send_raw(&self, req: RequestBuilder) -> ApiResult<String> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let message = wire::error_message(&body)
                .or_else(|| status.canonical_reason().map(String::from))
                .unwrap_or_default();
            warn!(status = status.as_u16(), %message, "request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let body = self.send_raw(req).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.into_inner())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!(path, "GET");
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        debug!(path, "POST");
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// POST whose response body is not needed
    async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        debug!(path, "POST");
        self.send_raw(self.request(Method::POST, path).json(body)).await.map(|_| ())
    }

    // ========================
    // Workspaces & Boards
    // ========================

    pub async fn list_workspaces(&self) -> ApiResult<Vec<Workspace>> {
        let raw: Vec<RawWorkspace> = self.get("/workspaces").await?;
        raw.into_iter().map(RawWorkspace::into_workspace).collect()
    }

    pub async fn workspace_boards(&self, workspace: &WorkspaceId) -> ApiResult<Vec<Board>> {
        let raw: Vec<RawBoard> = self.get(&format!("/boards/workspace/{}", workspace)).await?;
        raw.into_iter().map(RawBoard::into_board).collect()
    }

    pub async fn get_board(&self, board: &BoardId) -> ApiResult<Board> {
        let raw: RawBoard = self.get(&format!("/boards/{}", board)).await?;
        raw.into_board()
    }

    // ========================
    // Stages
    // ========================

    pub async fn list_stages(&self, board: &BoardId) -> ApiResult<Vec<Stage>> {
        let raw: Vec<RawStage> = self.get(&format!("/stages/board/{}", board)).await?;
        let ranked = raw
            .into_iter()
            .map(|s| Ok((s.ordinal(), s.into_stage(Some(board))?)))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(wire::dense_positions(ranked))
    }

    pub async fn create_stage(&self, board: &BoardId, name: &str, position: i32) -> ApiResult<Stage> {
        let body = CreateStageRequest {
            board_id: board,
            name,
            position,
        };
        let raw: RawStage = self.post("/stages", &body).await?;
        raw.into_stage(Some(board))
    }

    /// Persist the full stage order of a board
    pub async fn reorder_stages(&self, board: &BoardId, orders: &[StageOrder]) -> ApiResult<()> {
        let body = ReorderStagesRequest { stage_orders: orders };
        self.post_unit(&format!("/stages/board/{}/reorder", board), &body).await
    }

    // ========================
    // Cards
    // ========================

    pub async fn list_cards(&self, board: &BoardId) -> ApiResult<Vec<Card>> {
        let raw: Vec<RawCard> = self.get(&format!("/cards/board/{}", board)).await?;
        ranked_cards(raw, None)
    }

    pub async fn list_stage_cards(&self, stage: &StageId) -> ApiResult<Vec<Card>> {
        let raw: Vec<RawCard> = self.get(&format!("/cards/stage/{}", stage)).await?;
        ranked_cards(raw, Some(stage))
    }

    pub async fn move_card(&self, card: &CardId, stage: &StageId, position: i32) -> ApiResult<()> {
        let body = MoveCardRequest {
            target_stage_id: stage,
            target_position: position,
        };
        self.post_unit(&format!("/cards/{}/move", card), &body).await
    }

    // ========================
    // Comments
    // ========================

    pub async fn card_comments(&self, card: &CardId) -> ApiResult<Vec<Comment>> {
        let raw: Vec<RawComment> = self.get(&format!("/comments/card/{}", card)).await?;
        raw.into_iter().map(|c| c.into_comment(Some(card))).collect()
    }

    pub async fn create_comment(&self, card: &CardId, content: &str) -> ApiResult<Comment> {
        let body = CreateCommentRequest { card_id: card, content };
        let raw: RawComment = self.post("/comments", &body).await?;
        raw.into_comment(Some(card))
    }

    pub async fn update_comment(&self, comment: &Comment, content: &str) -> ApiResult<Comment> {
        let req = self
            .request(Method::PUT, &format!("/comments/{}", comment.id))
            .json(&UpdateCommentRequest { content });
        let raw: RawComment = self.send(req).await?;
        raw.into_comment(Some(&comment.card_id))
    }

    pub async fn delete_comment(&self, comment: &CommentId) -> ApiResult<()> {
        self.send_raw(self.request(Method::DELETE, &format!("/comments/{}", comment)))
            .await
            .map(|_| ())
    }

    // ========================
    // Session
    // ========================

    pub async fn current_user(&self) -> ApiResult<Member> {
        let payload: UserPayload = self.get("/auth/me").await?;
        payload.into_member()
    }
}

fn ranked_cards(raw: Vec<RawCard>, stage: Option<&StageId>) -> ApiResult<Vec<Card>> {
    let ranked = raw
        .into_iter()
        .map(|c| Ok((c.ordinal(), c.into_card(stage)?)))
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(wire::dense_positions(ranked))
}

#[async_trait(?Send)]
impl UserSource for ApiClient {
    async fn fetch_user(&self, token: &str) -> ApiResult<Member> {
        self.clone().with_token(Some(token.to_string())).current_user().await
    }
}
