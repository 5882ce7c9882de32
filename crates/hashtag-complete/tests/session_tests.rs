//! End-to-end session scenarios against the in-memory document

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hashtag_complete::*;
    use hashtag_keybinds::{Key, KeyDisposition};
    use tempfile::TempDir;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    }

    fn source(entries: &[(&str, &str)]) -> Arc<dyn CandidateSource> {
        Arc::new(StaticCandidateSource::new(
            entries
                .iter()
                .map(|(id, value)| Candidate::new(*id, *value))
                .collect(),
        ))
    }

    fn session(source: Arc<dyn CandidateSource>) -> HashtagSession<HeadlessTarget> {
        HashtagSession::new(&CompiledConfig::default(), source, HeadlessTarget::default())
    }

    /// Type text, run the resulting query, apply the response
    async fn type_text(
        session: &mut HashtagSession<HeadlessTarget>,
        doc: &mut MemoryDocument,
        text: &str,
    ) -> bool {
        doc.type_text(text).unwrap();
        match session.on_text_changed(doc, ChangeSource::User).unwrap() {
            Some(request) => {
                let response = session.resolve(request).await;
                session.apply_response(doc, response).unwrap()
            }
            None => false,
        }
    }

    #[tokio::test]
    async fn test_enter_inserts_token_and_space() {
        init_tracing();
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");

        assert!(type_text(&mut session, &mut doc, "hello #wor").await);
        assert_eq!(session.active_span().unwrap().start_offset, 6);
        assert_eq!(session.list().target().labels(), vec!["world"]);

        let disposition = session.handle_key(&mut doc, &Key::Enter.into()).unwrap();

        assert_eq!(disposition, KeyDisposition::Handled);
        assert_eq!(doc.to_string(), "hello [world](id=7) ");
        assert_eq!(doc.caret_offset(), Some(8));
        assert_eq!(doc.batches(), 1);
        assert_eq!(doc.embeds().len(), 1);
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_tab_commits_like_enter() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#wo").await;

        session.handle_key(&mut doc, &Key::Tab.into()).unwrap();
        assert_eq!(doc.to_string(), "[world](id=7) ");
    }

    #[tokio::test]
    async fn test_zero_results_offer_raw_query() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");

        assert!(type_text(&mut session, &mut doc, "#xyz").await);
        let selected = session.list().current_selection().unwrap();
        assert_eq!(selected.id, None);
        assert_eq!(selected.value, "xyz");

        let token = session.commit(&mut doc).unwrap().unwrap();
        assert_eq!(token, EmbedToken { id: None, value: "xyz".into() });
        assert_eq!(doc.to_string(), "[xyz] ");
    }

    #[tokio::test]
    async fn test_space_ends_query_and_passes_through() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#wor").await;
        assert!(session.is_open());

        let disposition = session.handle_key(&mut doc, &Key::SPACE.into()).unwrap();
        assert_eq!(disposition, KeyDisposition::Unhandled);
        assert!(!session.is_open());
        assert_eq!(session.state(), CompletionState::Closed);

        // The host inserts the space itself.
        assert!(!type_text(&mut session, &mut doc, " ").await);
        assert_eq!(doc.to_string(), "#wor ");
        assert!(doc.embeds().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_then_commit() {
        let mut session = session(source(&[("1", "work"), ("2", "world"), ("3", "worm")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#wor").await;

        session.handle_key(&mut doc, &Key::Down.into()).unwrap();
        session.handle_key(&mut doc, &Key::Down.into()).unwrap();
        session.handle_key(&mut doc, &Key::Up.into()).unwrap();
        assert_eq!(session.list().highlighted_index(), 1);

        session.handle_key(&mut doc, &Key::Up.into()).unwrap();
        session.handle_key(&mut doc, &Key::Up.into()).unwrap();
        assert_eq!(session.list().highlighted_index(), 2);

        session.handle_key(&mut doc, &Key::Enter.into()).unwrap();
        assert_eq!(doc.to_string(), "[worm](id=3) ");
    }

    #[tokio::test]
    async fn test_click_commits_row() {
        let mut session = session(source(&[("1", "work"), ("2", "world")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "go #w").await;

        let token = session.click_row(&mut doc, 1).unwrap().unwrap();
        assert_eq!(token.value, "world");
        assert_eq!(doc.to_string(), "go [world](id=2) ");
        assert!(session.click_row(&mut doc, 0).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_click_out_of_range_is_ignored() {
        let mut session = session(source(&[("1", "work")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#w").await;

        assert!(session.click_row(&mut doc, 5).unwrap().is_none());
        assert!(session.is_open());
        assert_eq!(doc.to_string(), "#w");
    }

    #[tokio::test]
    async fn test_escape_closes_without_editing() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#wor").await;

        assert_eq!(
            session.handle_key(&mut doc, &Key::Escape.into()).unwrap(),
            KeyDisposition::Handled
        );
        assert!(!session.is_open());
        assert_eq!(
            session.handle_key(&mut doc, &Key::Escape.into()).unwrap(),
            KeyDisposition::Unhandled
        );
        assert_eq!(doc.to_string(), "#wor");
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let mut session = session(source(&[("1", "w1"), ("2", "wo2")]));
        let mut doc = MemoryDocument::new("");

        doc.type_text("#w").unwrap();
        let first = session.on_text_changed(&doc, ChangeSource::User).unwrap().unwrap();
        doc.type_text("o").unwrap();
        let second = session.on_text_changed(&doc, ChangeSource::User).unwrap().unwrap();
        assert!(second.ticket.generation > first.ticket.generation);

        let first_response = session.resolve(first).await;
        let second_response = session.resolve(second).await;

        assert!(!session.apply_response(&doc, first_response.clone()).unwrap());
        assert!(!session.is_open());
        assert!(session.apply_response(&doc, second_response).unwrap());
        assert_eq!(session.list().target().labels(), vec!["wo2"]);

        // Arriving late changes nothing either.
        assert!(!session.apply_response(&doc, first_response).unwrap());
        assert_eq!(session.list().target().labels(), vec!["wo2"]);
    }

    #[tokio::test]
    async fn test_response_after_hide_is_discarded() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        doc.type_text("#wor").unwrap();
        let request = session.on_text_changed(&doc, ChangeSource::User).unwrap().unwrap();

        session.hide();
        let response = session.resolve(request).await;
        assert!(!session.apply_response(&doc, response).unwrap());
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_source_error_falls_back_to_raw_query() {
        init_tracing();
        let failing = FnCandidateSource::new(|_query: String| async move {
            Err(SourceError::Unavailable("backend down".to_string()))
        });
        let mut session = session(Arc::new(failing));
        let mut doc = MemoryDocument::new("");

        assert!(type_text(&mut session, &mut doc, "#rust").await);
        assert_eq!(session.list().candidates(), &[Candidate::raw("rust")]);
    }

    #[tokio::test]
    async fn test_typing_more_keeps_list_until_new_results() {
        let mut session = session(source(&[("1", "work"), ("2", "world")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#wor").await;

        doc.type_text("l").unwrap();
        let request = session.on_text_changed(&doc, ChangeSource::User).unwrap().unwrap();
        assert_eq!(session.state(), CompletionState::AwaitingCandidates);
        assert!(session.is_open());

        let response = session.resolve(request).await;
        session.apply_response(&doc, response).unwrap();
        assert_eq!(session.state(), CompletionState::Open);
        assert_eq!(session.list().target().labels(), vec!["world"]);
    }

    #[tokio::test]
    async fn test_same_caret_does_not_requery() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#wor").await;

        let selection = doc.selection();
        assert!(session.on_selection_changed(&doc, selection).unwrap().is_none());
        assert_eq!(session.detector().generation(), 1);
    }

    #[tokio::test]
    async fn test_caret_moved_out_of_query_closes() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#wor and more").await;
        assert!(!session.is_open());

        doc.set_caret(4).unwrap();
        let request = session.on_selection_changed(&doc, doc.selection()).unwrap();
        assert_eq!(request.unwrap().query, "wor");

        session.on_selection_changed(&doc, None).unwrap();
        assert_eq!(session.state(), CompletionState::Closed);
    }

    #[tokio::test]
    async fn test_moving_to_another_trigger_closes_old_candidates() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("#wor and #z");

        doc.set_caret(4).unwrap();
        let request = session.on_selection_changed(&doc, doc.selection()).unwrap().unwrap();
        let response = session.resolve(request).await;
        assert!(session.apply_response(&doc, response).unwrap());
        assert!(session.is_open());

        doc.set_caret(11).unwrap();
        let request = session.on_selection_changed(&doc, doc.selection()).unwrap().unwrap();
        assert_eq!(request.ticket.start_offset, 9);
        assert!(!session.is_open());

        // Enter reaches the host instead of committing "world" over "#z".
        assert_eq!(
            session.handle_key(&mut doc, &Key::Enter.into()).unwrap(),
            KeyDisposition::Unhandled
        );
        assert_eq!(doc.to_string(), "#wor and #z");

        let response = session.resolve(request).await;
        assert!(session.apply_response(&doc, response).unwrap());
        assert_eq!(session.active_span().unwrap().start_offset, 9);
    }

    #[tokio::test]
    async fn test_embed_after_trigger_is_not_query_text() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("#ab");
        let existing = EmbedToken {
            id: Some("1".to_string()),
            value: "old".to_string(),
        };
        doc.insert_embed(3, EMBED_KIND, &existing).unwrap();
        doc.set_caret(4).unwrap();

        assert!(session.on_text_changed(&doc, ChangeSource::User).unwrap().is_none());
        assert_eq!(session.state(), CompletionState::Closed);
        assert!(session.commit(&mut doc).unwrap().is_none());
        assert_eq!(doc.embeds(), vec![&existing]);
    }

    #[tokio::test]
    async fn test_spawned_queries_deliver_over_channel() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        doc.type_text("#wor").unwrap();
        let request = session.on_text_changed(&doc, ChangeSource::User).unwrap().unwrap();
        session.spawn(request, tx.clone()).await.unwrap();

        let response = rx.recv().await.unwrap();
        assert!(session.apply_response(&doc, response).unwrap());
        assert!(session.is_open());
    }

    #[tokio::test]
    async fn test_trigger_far_back_is_invisible() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("");
        let long_query = "a".repeat(31);

        assert!(!type_text(&mut session, &mut doc, &format!("#{long_query}")).await);
        assert_eq!(session.state(), CompletionState::Closed);
    }

    #[tokio::test]
    async fn test_embed_before_trigger_counts_as_one_offset() {
        let mut session = session(source(&[("1", "one"), ("2", "two")]));
        let mut doc = MemoryDocument::new("");
        type_text(&mut session, &mut doc, "#o").await;
        session.commit(&mut doc).unwrap();

        assert!(type_text(&mut session, &mut doc, "#t").await);
        assert_eq!(session.active_span().unwrap().start_offset, 2);
        session.commit(&mut doc).unwrap();
        assert_eq!(doc.to_string(), "[one](id=1) [two](id=2) ");
        assert_eq!(doc.caret_offset(), Some(4));
    }

    #[tokio::test]
    async fn test_session_from_yaml_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hashtag.yaml");
        std::fs::write(
            &path,
            "trigger_char: '@'\nmin_chars: 1\nallowed_chars: '[a-z]'\noffset_top: 4\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        let mut session = HashtagSession::from_config(
            &config,
            source(&[("u1", "alice")]),
            HeadlessTarget::default(),
        )
        .unwrap();
        let mut doc = MemoryDocument::new("");

        assert!(!type_text(&mut session, &mut doc, "@").await);
        assert!(type_text(&mut session, &mut doc, "al").await);
        assert_eq!(session.list().target().position.unwrap().top, 16.0 + 4.0);
        assert!(!type_text(&mut session, &mut doc, "1").await);
        assert!(!session.is_open());
    }

    #[tokio::test]
    async fn test_host_error_propagates() {
        let mut session = session(source(&[("7", "world")]));
        let mut doc = MemoryDocument::new("#wor");
        let request = session.on_text_changed(&doc, ChangeSource::User).unwrap().unwrap();
        let response = session.resolve(request).await;
        session.apply_response(&doc, response).unwrap();

        // Shrink the document behind the session's back.
        doc.delete_range(0, 4).unwrap();
        doc.set_caret(0).unwrap();
        let err = session.commit(&mut doc).unwrap_err();
        assert!(matches!(err, MemoryDocumentError::OutOfBounds { .. }));
        assert!(session.is_open());
    }
}
