/// Prefix of every conversation id (`conv_<lo>_<hi>`)
pub const CONVERSATION_ID_PREFIX: &str = "conv_";

/// Prefix of generated message ids (`msg_<counter>_<epoch>`)
pub const MESSAGE_ID_PREFIX: &str = "msg_";

/// Prefix of generated group ids (`group_<counter>_<epoch>`)
pub const GROUP_ID_PREFIX: &str = "group_";

/// Separator between the parts of a derived or generated id
pub const ID_SEPARATOR: char = '_';

/// Field separator of every persisted table
pub const FIELD_SEPARATOR: char = ',';

/// Separator inside list-valued fields (likes, group participants)
pub const LIST_SEPARATOR: char = ';';

/// Escape character for separators and line breaks inside a field
pub const ESCAPE_CHAR: char = '\\';

/// Table headers, exactly as written on disk
pub const USERS_HEADER: &str = "userId,username";
pub const CONVERSATIONS_HEADER: &str = "conversationId,participant1,participant2,messageData";
pub const GROUPS_HEADER: &str = "groupId,groupName,adminId,participants,messageData";

/// Default table file names
pub const DEFAULT_USERS_FILE: &str = "users.csv";
pub const DEFAULT_CONVERSATIONS_FILE: &str = "conversations.csv";
pub const DEFAULT_GROUPS_FILE: &str = "groups.csv";

/// Default number of messages a collaborator shows per container
pub const DEFAULT_RECENT_LIMIT: usize = 20;
