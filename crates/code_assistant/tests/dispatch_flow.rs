mod support;

use pretty_assertions::assert_eq;

use support::{invocation, read_seeded, seed_file, workspace_fixture, ScriptedPrompt};

#[test]
fn read_create_and_list_have_success_paths() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();

    let created = dispatcher.dispatch(
        &invocation(
            "call-1",
            "create-one",
            "{\"path\":\"notes/hello.txt\",\"content\":\"hello\"}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );
    assert!(
        created.content.starts_with("Successfully created/updated file"),
        "{}",
        created.content
    );
    assert_eq!(read_seeded(&session, "notes/hello.txt"), "hello");

    let read = dispatcher.dispatch(
        &invocation("call-2", "read-one", "{\"path\":\"notes/hello.txt\"}"),
        session.transcript_mut(),
        &mut prompt,
    );
    assert!(read.content.starts_with("Content of file"), "{}", read.content);
    assert!(read.content.ends_with("hello"), "{}", read.content);

    let listed = dispatcher.dispatch(
        &invocation("call-3", "list-directory", "{\"path\":\"notes\"}"),
        session.transcript_mut(),
        &mut prompt,
    );
    assert!(listed.content.contains("- hello.txt (file)"), "{}", listed.content);
}

#[test]
fn list_directory_defaults_to_the_workspace_root() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();
    seed_file(&session, "top.txt", "x");

    let listed = dispatcher.dispatch(
        &invocation("call-1", "list-directory", ""),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(listed.content.contains("- top.txt (file)"), "{}", listed.content);
}

#[test]
fn read_many_folds_per_file_failures_into_sections() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();
    seed_file(&session, "present.txt", "here");

    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "read-many",
            "{\"paths\":[\"present.txt\",\"absent.txt\"]}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(result.content.contains("MULTIPLE FILE RESULTS"), "{}", result.content);
    assert!(result.content.contains("here"), "{}", result.content);
    assert!(result.content.contains("Error reading"), "{}", result.content);
    assert!(result.content.contains("absent.txt"), "{}", result.content);
}

#[test]
fn edit_applies_and_refreshes_the_file_context() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();
    seed_file(&session, "greet.py", "print('Hello, world!')\n");

    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "edit",
            "{\"path\":\"greet.py\",\"original_snippet\":\"Hello, world!\",\
             \"replacement_snippet\":\"Aloha\"}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(
        result.content.starts_with("Successfully applied edit"),
        "{}",
        result.content
    );
    assert_eq!(read_seeded(&session, "greet.py"), "print('Aloha')\n");

    let contexts = session.file_context_paths();
    assert_eq!(contexts.len(), 1);
    let snapshot = session
        .transcript()
        .file_context(contexts[0])
        .and_then(|entry| entry.file_snapshot())
        .expect("snapshot exists");
    assert_eq!(snapshot, "print('Aloha')\n");
}

#[test]
fn repeating_an_applied_edit_fails_without_touching_the_file() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();
    seed_file(&session, "config.toml", "retries = 1\n");

    let edit_args = "{\"path\":\"config.toml\",\"original_snippet\":\"retries = 1\",\
                     \"replacement_snippet\":\"retries = 3\"}";

    let first = dispatcher.dispatch(
        &invocation("call-1", "edit", edit_args),
        session.transcript_mut(),
        &mut prompt,
    );
    assert!(first.content.starts_with("Successfully applied edit"), "{}", first.content);
    let after_first = read_seeded(&session, "config.toml");

    let second = dispatcher.dispatch(
        &invocation("call-2", "edit", edit_args),
        session.transcript_mut(),
        &mut prompt,
    );
    assert!(
        second.content.contains("Original snippet not found"),
        "{}",
        second.content
    );
    assert!(
        second.content.contains("retries = 1"),
        "expected snippet shown verbatim: {}",
        second.content
    );
    assert_eq!(read_seeded(&session, "config.toml"), after_first);
}

#[test]
fn duplicate_snippets_replace_only_the_leftmost_occurrence() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();
    seed_file(&session, "twice.txt", "foo middle foo\n");

    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "edit",
            "{\"path\":\"twice.txt\",\"original_snippet\":\"foo\",\
             \"replacement_snippet\":\"bar\"}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(result.content.starts_with("Warning"), "{}", result.content);
    assert!(
        result.content.contains("replaced the leftmost occurrence"),
        "{}",
        result.content
    );

    let content = read_seeded(&session, "twice.txt");
    assert_eq!(content, "bar middle foo\n");
    assert_eq!(content.matches("foo").count(), 1);
    assert_eq!(content.matches("bar").count(), 1);
}

#[test]
fn identical_replacement_reports_no_change_and_leaves_bytes_alone() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();
    seed_file(&session, "same.txt", "stable text\n");

    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "edit",
            "{\"path\":\"same.txt\",\"original_snippet\":\"stable\",\
             \"replacement_snippet\":\"stable\"}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(result.content.contains("no change"), "{}", result.content);
    assert_eq!(read_seeded(&session, "same.txt"), "stable text\n");
}

#[test]
fn editing_a_missing_file_reports_the_failure() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();

    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "edit",
            "{\"path\":\"ghost.txt\",\"original_snippet\":\"x\",\
             \"replacement_snippet\":\"y\"}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(result.content.contains("Edit aborted"), "{}", result.content);
    assert!(session.file_context_paths().is_empty());
}

#[test]
fn unknown_operations_are_reported_not_raised() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();

    let result = dispatcher.dispatch(
        &invocation("call-1", "delete-everything", "{}"),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(
        result.content.contains("Unknown operation 'delete-everything'"),
        "{}",
        result.content
    );
    assert!(result.content.contains("read-one"), "{}", result.content);
}

#[test]
fn malformed_argument_json_is_an_argument_parse_failure() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();

    let result = dispatcher.dispatch(
        &invocation("call-1", "read-one", "{\"path\": \"trunca"),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(
        result.content.contains("Could not parse arguments for 'read-one'"),
        "{}",
        result.content
    );
}

#[test]
fn missing_required_fields_are_a_schema_failure() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();

    let result = dispatcher.dispatch(
        &invocation("call-1", "edit", "{\"path\":\"a.txt\"}"),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(
        result.content.contains("Invalid arguments for 'edit'"),
        "{}",
        result.content
    );
    assert!(result.content.contains("original_snippet"), "{}", result.content);
}

#[test]
fn declined_sensitive_writes_abort_only_that_write() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::declining_sensitive();

    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "create-one",
            "{\"path\":\"/code-assistant-sensitive-write-test\",\"content\":\"never\"}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(result.content.contains("Permission denied"), "{}", result.content);
    assert!(!std::path::Path::new("/code-assistant-sensitive-write-test").exists());
    assert_eq!(prompt.sensitive_requests.len(), 1);
}

#[test]
fn writes_outside_the_workspace_carry_a_passive_notice() {
    let (dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();

    // Resolve through the workspace root into its parent temp directory.
    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "create-one",
            "{\"path\":\"../outside-note.txt\",\"content\":\"out\"}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(
        result.content.contains("Successfully created/updated file"),
        "{}",
        result.content
    );
    assert!(
        result.content.contains("outside the active workspace root"),
        "{}",
        result.content
    );
    let outside = dir
        .path()
        .canonicalize()
        .expect("canonical temp dir")
        .parent()
        .expect("parent")
        .join("outside-note.txt");
    assert_eq!(std::fs::read_to_string(&outside).expect("outside file"), "out");
    std::fs::remove_file(outside).expect("clean up outside file");
}

#[test]
fn create_many_writes_every_requested_file() {
    let (_dir, mut session, mut dispatcher) = workspace_fixture();
    let mut prompt = ScriptedPrompt::accept_all();

    let result = dispatcher.dispatch(
        &invocation(
            "call-1",
            "create-many",
            "{\"files\":[{\"path\":\"a/one.txt\",\"content\":\"1\"},\
             {\"path\":\"a/two.txt\",\"content\":\"2\"}]}",
        ),
        session.transcript_mut(),
        &mut prompt,
    );

    assert!(
        result.content.starts_with("Successfully created/updated 2 files"),
        "{}",
        result.content
    );
    assert_eq!(read_seeded(&session, "a/one.txt"), "1");
    assert_eq!(read_seeded(&session, "a/two.txt"), "2");
}
