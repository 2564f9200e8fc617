use palaver_store::{ContainerKind, ConversationId, Messenger, MessageLog, StoreError};

fn alice_and_bob() -> (tempfile::TempDir, Messenger) {
    let dir = tempfile::tempdir().unwrap();
    let mut messenger = Messenger::open_in(dir.path()).unwrap();
    messenger.register("u1", "Alice").unwrap();
    messenger.register("u2", "Bob").unwrap();
    (dir, messenger)
}

#[test]
fn test_first_direct_message() {
    let (_dir, mut messenger) = alice_and_bob();
    messenger.login("u1").unwrap();
    messenger.send_direct_message("u2", "hi").unwrap();

    let convs = messenger.conversations_for("u1");
    assert_eq!(convs.len(), 1);
    assert_eq!(convs[0].message_count(), 1);
    assert_eq!(convs[0].messages()[0].content(), "hi");
    assert_eq!(messenger.conversations_for("u2").len(), 1);
    assert_eq!(messenger.my_conversations().unwrap().len(), 1);
}

#[test]
fn test_unauthenticated_send_creates_nothing() {
    let (_dir, mut messenger) = alice_and_bob();
    assert!(matches!(
        messenger.send_direct_message("u2", "hi"),
        Err(StoreError::NotAuthenticated)
    ));
    assert!(messenger.conversations_for("u1").is_empty());
    assert!(messenger.conversation("u1", "u2").is_none());
    assert!(matches!(messenger.my_conversations(), Err(StoreError::NotAuthenticated)));
}

#[test]
fn test_double_like_counts_once() {
    let (_dir, mut messenger) = alice_and_bob();
    messenger.login("u1").unwrap();
    let msg = messenger.send_direct_message("u2", "hi").unwrap();
    let conv_id = ConversationId::between("u2", "u1");

    messenger.login("u2").unwrap();
    assert!(!messenger
        .unlike(msg.id(), conv_id.as_str(), ContainerKind::Conversation)
        .unwrap());
    assert!(messenger
        .like(msg.id(), conv_id.as_str(), ContainerKind::Conversation)
        .unwrap());
    assert!(!messenger
        .like(msg.id(), conv_id.as_str(), ContainerKind::Conversation)
        .unwrap());

    let conv = messenger.conversation("u1", "u2").unwrap();
    assert_eq!(conv.find_message(msg.id()).unwrap().like_count(), 1);

    assert!(messenger
        .unlike(msg.id(), conv_id.as_str(), ContainerKind::Conversation)
        .unwrap());
    let conv = messenger.conversation("u1", "u2").unwrap();
    assert_eq!(conv.find_message(msg.id()).unwrap().like_count(), 0);
}

#[test]
fn test_group_admin_rules() {
    let (_dir, mut messenger) = alice_and_bob();
    messenger.register("u3", "Carol").unwrap();
    messenger.login("u1").unwrap();
    let group = messenger.create_group("Team", &["u2"]).unwrap();

    messenger.login("u2").unwrap();
    assert!(matches!(
        messenger.add_group_member(group.id(), "u3"),
        Err(StoreError::NotAuthorized)
    ));

    messenger.login("u1").unwrap();
    assert!(matches!(
        messenger.remove_group_member(group.id(), "u1"),
        Err(StoreError::CannotRemoveAdmin)
    ));
    assert_eq!(messenger.group(group.id()).unwrap().participant_count(), 2);
}

#[test]
fn test_create_group_is_all_or_nothing() {
    let (_dir, mut messenger) = alice_and_bob();
    messenger.login("u1").unwrap();
    assert!(matches!(
        messenger.create_group("Team", &["u2", "ghost"]),
        Err(StoreError::UnknownParticipant(id)) if id == "ghost"
    ));
    assert!(messenger.groups_for("u1").is_empty());
    assert_eq!(messenger.statistics().groups, 0);
}

#[test]
fn test_non_member_cannot_post_to_group() {
    let (_dir, mut messenger) = alice_and_bob();
    messenger.register("u3", "Carol").unwrap();
    messenger.login("u1").unwrap();
    let group = messenger.create_group("Team", &["u2"]).unwrap();
    messenger.send_group_message(group.id(), "welcome").unwrap();

    messenger.login("u3").unwrap();
    assert!(matches!(
        messenger.send_group_message(group.id(), "let me in"),
        Err(StoreError::NotGroupMember(_))
    ));
    assert_eq!(messenger.group(group.id()).unwrap().message_count(), 1);

    assert!(matches!(
        messenger.like("whatever", group.id(), ContainerKind::Group),
        Err(StoreError::NotAParticipant(_))
    ));
    assert!(matches!(
        messenger.send_group_message("group_missing", "hello?"),
        Err(StoreError::UnknownGroup(_))
    ));
}

#[test]
fn test_group_likes_and_views() {
    let (_dir, mut messenger) = alice_and_bob();
    messenger.login("u1").unwrap();
    let group = messenger.create_group("Team", &["u2"]).unwrap();
    let msg = messenger.send_group_message(group.id(), "standup?").unwrap();

    messenger.login("u2").unwrap();
    assert!(messenger.like(msg.id(), group.id(), ContainerKind::Group).unwrap());
    assert_eq!(messenger.my_groups().unwrap().len(), 1);

    let stored = messenger.group(group.id()).unwrap();
    assert_eq!(stored.find_message(msg.id()).unwrap().liked_by(), ["u2".to_string()]);
    assert_eq!(stored.recent(Some(1))[0].content(), "standup?");
}

#[test]
fn test_underscore_ids_cannot_register() {
    let (_dir, mut messenger) = alice_and_bob();
    assert!(matches!(
        messenger.register("b_c", "Ambiguous"),
        Err(StoreError::InvalidField { field: "user id", .. })
    ));
    assert!(!messenger.user_exists("b_c"));
}

#[test]
fn test_colliding_conversation_ids_stay_private() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("users.csv"),
        "userId,username\na,A\na_b,AB\nb_c,BC\nc,C\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("conversations.csv"),
        "conversationId,participant1,participant2,messageData\n\
         conv_a_b_c,a_b,c,msg_1_100,a_b,secret for c,100,0,\n",
    )
    .unwrap();

    let mut messenger = Messenger::open_in(dir.path()).unwrap();
    messenger.login("a").unwrap();

    assert!(messenger.conversation("a", "b_c").is_none());
    assert!(messenger.conversations_for("a").is_empty());
    assert!(matches!(
        messenger.send_direct_message("b_c", "hello"),
        Err(StoreError::ConversationConflict(id)) if id == "conv_a_b_c"
    ));

    let owned = messenger.conversation("c", "a_b").unwrap();
    assert_eq!(owned.message_count(), 1);
    assert_eq!(owned.messages()[0].content(), "secret for c");
    assert_eq!(messenger.statistics().messages, 1);
}
