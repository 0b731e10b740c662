//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed connection. Aggregates are stored as rows
//! plus JSON blobs (patient data, assessment) and reconstituted whole.

mod message;
mod reference;
mod session;
mod token;
mod user;

pub use message::*;
pub use reference::*;
pub use session::*;
pub use token::*;
pub use user::*;

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rusqlite::Connection;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::*;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_session(conn: &Connection) -> ChatSession {
        let session = ChatSession::new();
        insert_session(conn, &session).unwrap();
        session
    }

    fn make_user(conn: &Connection, email: &str) -> User {
        let user = User::new(
            email,
            "hashed-password",
            "Claire",
            "Moreau",
            ProfileFields::default(),
            "verification-token".to_string(),
        );
        insert_user(conn, &user).unwrap();
        user
    }

    // ═══════════════════════════════════════════
    // Sessions
    // ═══════════════════════════════════════════

    #[test]
    fn session_round_trip_with_blobs() {
        let conn = test_db();
        let mut session = make_session(&conn);

        let data = session.patient_data_mut();
        data.set_basic_info(Some("8 ans"), Some("mâle castré"), Some("Labrador"), Some("32 kg"));
        data.add_symptom("convulsions");
        data.add_exam_result("neurological_exam", json!("réflexes diminués"));
        session.sync_collection_phase();
        session.set_thread("thread_abc123");
        session.update_assessment(
            VeterinaryAssessment::from_value(&json!({
                "assessment": "Suspicion d'épilepsie",
                "status": "completed",
                "question": "Depuis quand?"
            }))
            .unwrap(),
        );
        update_session(&conn, &session).unwrap();

        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert!(!loaded.is_collecting_data);
        assert_eq!(loaded.assistant_thread_id.as_deref(), Some("thread_abc123"));

        let data = loaded.patient_data.unwrap();
        assert_eq!(data.age.as_deref(), Some("8 ans"));
        assert_eq!(data.symptoms, vec!["convulsions"]);
        assert!(data.is_complete);

        let assessment = loaded.current_assessment.unwrap();
        assert_eq!(assessment.assessment, "Suspicion d'épilepsie");
        assert_eq!(assessment.status, AssessmentStatus::Completed);
    }

    #[test]
    fn missing_session_reads_as_none() {
        let conn = test_db();
        assert!(get_session(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn updating_missing_session_is_not_found() {
        let conn = test_db();
        let session = ChatSession::new();
        let err = update_session(&conn, &session).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn sessions_are_found_by_slug() {
        let conn = test_db();
        let mut session = make_session(&conn);
        session.set_slug_from("Mon chien tremble beaucoup");
        update_session(&conn, &session).unwrap();

        let slug = session.slug.clone().unwrap();
        let loaded = get_session_by_slug(&conn, &slug).unwrap().unwrap();
        assert_eq!(loaded.id, session.id);

        assert!(get_session_by_slug(&conn, "aucun-slug").unwrap().is_none());
    }

    #[test]
    fn user_sessions_list_most_recent_first() {
        let conn = test_db();
        let user = make_user(&conn, "vet@clinique.fr");

        let mut older = make_session(&conn);
        older.link_user(user.id);
        older.updated_at = Utc::now() - Duration::hours(2);
        update_session(&conn, &older).unwrap();

        let mut newer = make_session(&conn);
        newer.link_user(user.id);
        update_session(&conn, &newer).unwrap();

        // Unlinked session must not appear.
        make_session(&conn);

        let sessions = list_sessions_for_user(&conn, &user.id).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, newer.id);
        assert_eq!(sessions[1].id, older.id);
    }

    // ═══════════════════════════════════════════
    // Messages
    // ═══════════════════════════════════════════

    #[test]
    fn messages_read_back_in_chronological_order() {
        let conn = test_db();
        let session = make_session(&conn);
        let base = Utc::now();

        for i in 0..3 {
            let mut msg = ChatMessage::user(session.id, format!("message {i}"));
            msg.timestamp = base + Duration::seconds(i);
            insert_chat_message(&conn, &msg).unwrap();
        }

        let messages = get_session_messages(&conn, &session.id).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "message 0");
        assert_eq!(messages[2].content, "message 2");
    }

    #[test]
    fn recent_window_keeps_newest_and_chronological_order() {
        let conn = test_db();
        let session = make_session(&conn);
        let base = Utc::now();

        for i in 0..5 {
            let mut msg = ChatMessage::user(session.id, format!("message {i}"));
            msg.timestamp = base + Duration::seconds(i);
            insert_chat_message(&conn, &msg).unwrap();
        }

        let window = get_recent_messages(&conn, &session.id, 3).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].content, "message 2");
        assert_eq!(window[2].content, "message 4");
    }

    #[test]
    fn assistant_metadata_round_trips() {
        let conn = test_db();
        let session = make_session(&conn);
        let msg = ChatMessage::assistant(
            session.id,
            "Assessment: épilepsie probable",
            AssessmentStatus::Completed,
            Some("Fréquence des crises?".to_string()),
        );
        insert_chat_message(&conn, &msg).unwrap();

        let messages = get_session_messages(&conn, &session.id).unwrap();
        assert_eq!(messages[0].status, Some(AssessmentStatus::Completed));
        assert_eq!(messages[0].question.as_deref(), Some("Fréquence des crises?"));
    }

    #[test]
    fn user_message_count_ignores_assistant_turns() {
        let conn = test_db();
        let session = make_session(&conn);
        insert_chat_message(&conn, &ChatMessage::user(session.id, "bonjour")).unwrap();
        insert_chat_message(
            &conn,
            &ChatMessage::assistant(session.id, "réponse", AssessmentStatus::Processed, None),
        )
        .unwrap();

        assert_eq!(count_user_messages(&conn, &session.id).unwrap(), 1);
    }

    // ═══════════════════════════════════════════
    // Users and tokens
    // ═══════════════════════════════════════════

    #[test]
    fn user_round_trip_and_email_lookup() {
        let conn = test_db();
        let user = make_user(&conn, "vet@clinique.fr");

        let loaded = get_user_by_email(&conn, "vet@clinique.fr").unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert!(!loaded.is_verified);
        assert!(email_exists(&conn, "vet@clinique.fr").unwrap());
        assert!(!email_exists(&conn, "autre@clinique.fr").unwrap());
    }

    #[test]
    fn duplicate_email_violates_unique_constraint() {
        let conn = test_db();
        make_user(&conn, "vet@clinique.fr");
        let dup = User::new(
            "vet@clinique.fr",
            "other-hash",
            "Paul",
            "Garnier",
            ProfileFields::default(),
            "other-token".to_string(),
        );
        assert!(insert_user(&conn, &dup).is_err());
    }

    #[test]
    fn verification_token_lookup_and_consumption() {
        let conn = test_db();
        let mut user = make_user(&conn, "vet@clinique.fr");

        let found = get_user_by_verification_token(&conn, "verification-token")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);

        user.verify_email();
        update_user(&conn, &user).unwrap();

        assert!(get_user_by_verification_token(&conn, "verification-token")
            .unwrap()
            .is_none());
        let loaded = get_user(&conn, &user.id).unwrap().unwrap();
        assert!(loaded.is_verified);
    }

    #[test]
    fn refresh_token_revocation_round_trip() {
        let conn = test_db();
        let user = make_user(&conn, "vet@clinique.fr");
        let token = RefreshToken::new(user.id, "hash-1".to_string(), 30);
        insert_refresh_token(&conn, &token).unwrap();

        let loaded = get_refresh_token_by_hash(&conn, "hash-1").unwrap().unwrap();
        assert!(loaded.is_valid());

        revoke_refresh_token(&conn, &token.id).unwrap();
        let loaded = get_refresh_token_by_hash(&conn, "hash-1").unwrap().unwrap();
        assert!(loaded.revoked);
        assert!(!loaded.is_valid());
    }

    #[test]
    fn pruning_removes_expired_and_revoked_tokens() {
        let conn = test_db();
        let user = make_user(&conn, "vet@clinique.fr");

        let mut expired = RefreshToken::new(user.id, "hash-expired".to_string(), 30);
        expired.expires_at = Utc::now() - Duration::days(1);
        insert_refresh_token(&conn, &expired).unwrap();

        let live = RefreshToken::new(user.id, "hash-live".to_string(), 30);
        insert_refresh_token(&conn, &live).unwrap();

        let mut stale_access = AccessToken::new(user.id, "access-stale".to_string(), 30);
        stale_access.expires_at = Utc::now() - Duration::minutes(5);
        insert_access_token(&conn, &stale_access).unwrap();

        let live_access = AccessToken::new(user.id, "access-live".to_string(), 30);
        insert_access_token(&conn, &live_access).unwrap();

        prune_expired_tokens(&conn, Utc::now()).unwrap();

        assert!(get_refresh_token_by_hash(&conn, "hash-expired").unwrap().is_none());
        assert!(get_refresh_token_by_hash(&conn, "hash-live").unwrap().is_some());
        assert!(get_access_token(&conn, "access-stale").unwrap().is_none());
        assert!(get_access_token(&conn, "access-live").unwrap().is_some());
    }

    // ═══════════════════════════════════════════
    // Reference data
    // ═══════════════════════════════════════════

    #[test]
    fn reference_seed_is_idempotent() {
        let conn = test_db();
        seed_reference_data(&conn).unwrap();
        seed_reference_data(&conn).unwrap();

        let breeds = list_dog_breeds(&conn).unwrap();
        assert_eq!(breeds.len(), 46);
        assert!(breeds.iter().any(|b| b.name == "Labrador Retriever"));

        let reasons = list_consultation_reasons(&conn).unwrap();
        assert_eq!(reasons.len(), 6);
        assert_eq!(reasons[0].name, "Tremblements et/ou incoordination des mouvements");
        assert!(reasons[0].description.is_none());
    }
}
