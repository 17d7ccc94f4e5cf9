#![allow(dead_code)]

use chrono::{DateTime, Utc};

use super::{
    DomainEvent, EventEnvelope, RehydrateError, UserId, UserRegistered, Username,
};

/// ユーザー集約
///
/// ライフサイクル：`UserRegistered` で生成され、以後破棄されない。
/// 現在のコアではこれ以外の変更イベントを持たない。
///
/// 決定メソッドはイベントの発行と自身への適用を1ステップで行う。
/// 発行済み・未コミットのイベントは `drain()` で取り出す。
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    username: Username,
    version: u64,
    recorded: Vec<EventEnvelope>,
}

impl User {
    /// 決定：ユーザーを登録する
    ///
    /// 空のストリームからのみ有効。新しい集約として構築することで
    /// 既存ユーザーへの再登録を型レベルで排除する。
    pub fn register(id: UserId, username: Username, registered_at: DateTime<Utc>) -> Self {
        let envelope = EventEnvelope::new(
            id.value(),
            1,
            registered_at,
            DomainEvent::UserRegistered(UserRegistered {
                username: username.clone(),
            }),
        );

        Self {
            id,
            username,
            version: 1,
            recorded: vec![envelope],
        }
    }

    /// イベント列から現在の状態を復元する
    ///
    /// # エラー
    /// 列が空、または先頭が `UserRegistered` でない場合は `EmptyStream`。
    /// 途中に想定外の種別が現れた場合は `UnexpectedEvent`（ログ破損）。
    pub fn rehydrate(events: &[EventEnvelope]) -> Result<Self, RehydrateError> {
        let (first, rest) = events.split_first().ok_or(RehydrateError::EmptyStream)?;

        let username = match &first.payload {
            DomainEvent::UserRegistered(e) => e.username.clone(),
            _ => return Err(RehydrateError::EmptyStream),
        };

        // ユーザー集約は生成後の変更イベントを持たない
        if let Some(envelope) = rest.first() {
            return Err(RehydrateError::UnexpectedEvent(envelope.kind()));
        }

        Ok(Self {
            id: UserId::from_uuid(first.aggregate_id),
            username,
            version: first.version,
            recorded: Vec::new(),
        })
    }

    /// 未コミットのイベントを取り出し、バッファを空にする
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.recorded)
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
