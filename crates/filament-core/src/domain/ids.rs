//! Domain identifiers (strongly-typed IDs).
//!
//! Dep と Subscriber の ID は同じ `Id<T>` で表現し、マーカー型で区別します。
//! 値はプロセス内で単調増加するカウンタから払い出します（生成順でソート可能）。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"dep-", "sub-"）と、払い出し用のカウンタを提供します。
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "dep-"）
    fn prefix() -> &'static str;

    /// この ID 型専用のカウンタ
    fn counter() -> &'static AtomicU64;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しませんが、
/// コンパイル時に DepId と SubscriberId の混同を防ぎます。
#[repr(transparent)]
#[derive(Debug, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    raw: u64,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// Allocate the next id for `T`.
    pub fn next() -> Self {
        Self::from_raw(T::counter().fetch_add(1, Ordering::Relaxed))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn as_u64(&self) -> u64 {
        self.raw
    }
}

// derive だと `T: Clone` などの境界が付いてしまうため手で実装する
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: IdMarker> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: IdMarker> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.raw)
    }
}

// ========================================
// マーカー型の定義
// ========================================

static NEXT_DEP: AtomicU64 = AtomicU64::new(1);
static NEXT_SUBSCRIBER: AtomicU64 = AtomicU64::new(1);

/// Dep のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DepMarker {}

impl IdMarker for DepMarker {
    fn prefix() -> &'static str {
        "dep-"
    }

    fn counter() -> &'static AtomicU64 {
        &NEXT_DEP
    }
}

/// Subscriber のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubscriberMarker {}

impl IdMarker for SubscriberMarker {
    fn prefix() -> &'static str {
        "sub-"
    }

    fn counter() -> &'static AtomicU64 {
        &NEXT_SUBSCRIBER
    }
}

/// Identifier of a Dependency Set.
pub type DepId = Id<DepMarker>;

/// Identifier of a subscriber (deduplication key inside one Dep).
pub type SubscriberId = Id<SubscriberMarker>;
