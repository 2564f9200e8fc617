//! Text codec for the three persisted tables.
//!
//! Layouts (one header row, then data rows):
//!
//! | table         | columns                                                   |
//! |---------------|-----------------------------------------------------------|
//! | identities    | `userId,username`                                         |
//! | conversations | `conversationId,participant1,participant2,messageData`    |
//! | groups        | `groupId,groupName,adminId,participants,messageData`      |
//!
//! Container tables hold one row per message; a container without messages
//! is a single row with an empty `messageData`. The message record itself is
//! `messageId,senderId,content,timestampEpoch,statusInt,likedBy`, with
//! `likedBy` and group `participants` joined by `;`.
//!
//! Everything here works on strings; file access lives in [`crate::storage`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SubsecRound, Utc};

use palaver_shared::constants::{CONVERSATIONS_HEADER, FIELD_SEPARATOR, GROUPS_HEADER, USERS_HEADER};
use palaver_shared::error::RecordError;
use palaver_shared::record::{escape, join_fields, join_list, split_list, split_raw, split_row, unescape};
use palaver_shared::types::{ConversationId, MessageStatus};

use crate::conversations::Conversation;
use crate::groups::GroupChat;
use crate::models::{Identity, Message, MessageLog};

const MESSAGE_FIELDS: usize = 6;

/// A row that failed to decode, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub source: RecordError,
}

pub type RowResult<T> = std::result::Result<T, RowError>;

// ---------------------------------------------------------------------------
// Message record
// ---------------------------------------------------------------------------

pub fn encode_message(message: &Message) -> String {
    join_fields([
        escape(message.id()),
        escape(message.sender_id()),
        escape(message.content()),
        message.created_at().timestamp().to_string(),
        message.status().as_int().to_string(),
        join_list(message.liked_by()),
    ])
}

pub fn decode_message(raw: &str) -> Result<Message, RecordError> {
    let fields = split_raw(raw, FIELD_SEPARATOR, usize::MAX);
    if fields.len() != MESSAGE_FIELDS {
        return Err(RecordError::FieldCount {
            expected: MESSAGE_FIELDS,
            found: fields.len(),
        });
    }

    let id = required(unescape(fields[0])?, "messageId")?;
    let sender_id = required(unescape(fields[1])?, "senderId")?;
    let content = unescape(fields[2])?;
    let created_at = parse_timestamp(fields[3])?;
    let status = parse_status(fields[4])?;
    let liked_by = split_list(fields[5])?;

    Ok(Message::from_parts(id, sender_id, content, created_at, status, liked_by))
}

fn required(value: String, field: &'static str) -> Result<String, RecordError> {
    if value.is_empty() {
        Err(RecordError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RecordError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| RecordError::InvalidTimestamp(raw.to_string()))
}

fn parse_status(raw: &str) -> Result<MessageStatus, RecordError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(MessageStatus::from_int)
        .ok_or_else(|| RecordError::InvalidStatus(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

pub fn encode_users<'a>(users: impl IntoIterator<Item = &'a Identity>) -> String {
    let mut out = table(USERS_HEADER);
    for user in users {
        push_row(&mut out, join_fields([escape(&user.id), escape(&user.display_name)]));
    }
    out
}

/// Decode the identity table. A repeated `userId` is a corrupt row.
pub fn decode_users(text: &str) -> RowResult<Vec<Identity>> {
    let mut users = Vec::new();
    let mut seen = BTreeSet::new();
    for (line, row) in data_rows(text) {
        let identity = decode_user_row(row).map_err(|source| RowError { line, source })?;
        if !seen.insert(identity.id.clone()) {
            return Err(RowError {
                line,
                source: RecordError::DuplicateId(identity.id),
            });
        }
        users.push(identity);
    }
    Ok(users)
}

fn decode_user_row(row: &str) -> Result<Identity, RecordError> {
    let fields = split_row(row, 2)?;
    Ok(Identity {
        id: required(unescape(fields[0])?, "userId")?,
        display_name: unescape(fields[1])?,
    })
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

pub fn encode_conversations<'a>(conversations: impl IntoIterator<Item = &'a Conversation>) -> String {
    let mut out = table(CONVERSATIONS_HEADER);
    for conv in conversations {
        let [p1, p2] = conv.participants();
        let prefix = [escape(conv.id().as_str()), escape(p1), escape(p2)];

        if conv.messages().is_empty() {
            push_row(&mut out, join_fields(prefix.iter().chain([&String::new()])));
            continue;
        }
        for message in conv.messages() {
            let data = encode_message(message);
            push_row(&mut out, join_fields(prefix.iter().chain([&data])));
        }
    }
    out
}

/// Rebuild conversations, accumulating every row that shares an id.
pub fn decode_conversations(text: &str) -> RowResult<BTreeMap<String, Conversation>> {
    let mut conversations: BTreeMap<String, Conversation> = BTreeMap::new();
    for (line, row) in data_rows(text) {
        decode_conversation_row(row, &mut conversations).map_err(|source| RowError { line, source })?;
    }
    Ok(conversations)
}

fn decode_conversation_row(
    row: &str,
    conversations: &mut BTreeMap<String, Conversation>,
) -> Result<(), RecordError> {
    let fields = split_row(row, 4)?;
    let conv_id = required(unescape(fields[0])?, "conversationId")?;
    let p1 = required(unescape(fields[1])?, "participant1")?;
    let p2 = required(unescape(fields[2])?, "participant2")?;
    let message = decode_optional_message(fields[3])?;

    let expected = ConversationId::between(&p1, &p2);
    if expected.as_str() != conv_id {
        return Err(RecordError::ConversationIdMismatch {
            expected: expected.0,
            found: conv_id,
        });
    }

    let conv = conversations.entry(conv_id).or_insert_with(|| {
        let created_at = first_timestamp(message.as_ref());
        Conversation::with_created_at(&p1, &p2, created_at)
    });
    if let Some(message) = message {
        // Persisted history is authoritative; it is not re-validated.
        conv.push_unchecked(message);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

pub fn encode_groups<'a>(groups: impl IntoIterator<Item = &'a GroupChat>) -> String {
    let mut out = table(GROUPS_HEADER);
    for group in groups {
        let prefix = [
            escape(group.id()),
            escape(group.name()),
            escape(group.admin_id()),
            join_list(group.participants()),
        ];

        if group.messages().is_empty() {
            push_row(&mut out, join_fields(prefix.iter().chain([&String::new()])));
            continue;
        }
        for message in group.messages() {
            let data = encode_message(message);
            push_row(&mut out, join_fields(prefix.iter().chain([&data])));
        }
    }
    out
}

/// Rebuild groups. Every row of a group must repeat the name, admin and
/// participant list of its first row; only the message differs.
pub fn decode_groups(text: &str) -> RowResult<BTreeMap<String, GroupChat>> {
    let mut groups: BTreeMap<String, GroupChat> = BTreeMap::new();
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (line, row) in data_rows(text) {
        decode_group_row(row, &mut groups, &mut headers).map_err(|source| RowError { line, source })?;
    }
    Ok(groups)
}

fn decode_group_row(
    row: &str,
    groups: &mut BTreeMap<String, GroupChat>,
    headers: &mut BTreeMap<String, String>,
) -> Result<(), RecordError> {
    let fields = split_row(row, 5)?;
    let group_id = required(unescape(fields[0])?, "groupId")?;

    // Raw name, admin and participants, compared as written.
    let header = join_fields(&fields[1..4]);
    match headers.get(&group_id) {
        Some(first) if *first != header => {
            return Err(RecordError::InconsistentGroupRow(group_id));
        }
        Some(_) => {}
        None => {
            headers.insert(group_id.clone(), header);
        }
    }

    let name = unescape(fields[1])?;
    let admin_id = required(unescape(fields[2])?, "adminId")?;
    let participants = split_list(fields[3])?;
    let message = decode_optional_message(fields[4])?;

    let group = groups.entry(group_id.clone()).or_insert_with(|| {
        let created_at = first_timestamp(message.as_ref());
        let mut group = GroupChat::with_created_at(group_id, name, admin_id, created_at);
        for user_id in participants {
            group.restore_participant(user_id);
        }
        group
    });
    if let Some(message) = message {
        // Senders may have left the group since; keep their messages.
        group.push_unchecked(message);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn table(header: &str) -> String {
    let mut out = String::from(header);
    out.push('\n');
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(&row);
    out.push('\n');
}

/// Data rows with their 1-based line numbers. The header line and blank
/// lines are skipped.
fn data_rows(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| !row.trim().is_empty())
        .map(|(i, row)| (i + 1, row))
}

fn decode_optional_message(raw: &str) -> Result<Option<Message>, RecordError> {
    if raw.is_empty() {
        Ok(None)
    } else {
        decode_message(raw).map(Some)
    }
}

fn first_timestamp(message: Option<&Message>) -> DateTime<Utc> {
    message
        .map(Message::created_at)
        .unwrap_or_else(|| Utc::now().trunc_subsecs(0))
}
