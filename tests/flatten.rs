use std::{error::Error, io};

use faultline::{
    Fault, Location, OptionExt, ResultExt, Step, Tag, find, flatten_with, locations, msg,
    options::{BareLocations, FlattenOptions, NestedMessages},
    root_cause, tag, values,
};

#[derive(Debug, thiserror::Error)]
#[error("record not found")]
struct NotFound;

#[derive(Debug, thiserror::Error)]
enum StoreError {
    #[error("query failed: {0}")]
    Query(#[source] io::Error),
    #[error("lookup failed")]
    Lookup(#[source] Fault),
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("service call failed")]
struct ServiceError {
    source: Fault,
}

fn placeholder() -> FlattenOptions {
    FlattenOptions::new()
}

fn merge() -> FlattenOptions {
    FlattenOptions::new().bare_locations(BareLocations::Merge)
}

fn steps(err: &(dyn Error + 'static), options: FlattenOptions) -> Vec<(String, Option<Location>)> {
    flatten_with(err, options)
        .into_iter()
        .map(|step| (step.message().to_owned(), step.location()))
        .collect()
}

fn root() -> Result<(), NotFound> {
    Err(NotFound)
}

fn inner() -> Result<(), Fault> {
    root().wrap()
}

fn middle() -> Result<(), Fault> {
    inner().wrap_with([msg::with("failed to call function")])
}

fn outer() -> Result<(), Fault> {
    middle().wrap()
}

#[test]
fn call_stack_locations_attach_to_messages() {
    let err = outer().unwrap_err();
    let [outer_at, middle_at, inner_at] = locations(&err)[..] else {
        panic!("expected three locations");
    };

    assert_eq!(
        steps(&err, placeholder()),
        [
            ("record not found".to_owned(), Some(inner_at)),
            ("failed to call function".to_owned(), Some(middle_at)),
            (String::new(), Some(outer_at)),
        ]
    );

    assert_eq!(
        steps(&err, merge()),
        [
            ("record not found".to_owned(), Some(inner_at)),
            ("failed to call function".to_owned(), Some(middle_at)),
        ]
    );
}

#[test]
fn root_identity_is_preserved() {
    let err = outer().unwrap_err();
    let chain = flatten_with(&err, placeholder());

    let root = chain.root().expect("chain has a root");
    assert!(root.is::<NotFound>());
    assert!(root.source().is_none());
    assert!(std::ptr::addr_eq(root, root_cause(&err)));
    assert!(find::<NotFound>(&err).is_some());
}

#[test]
fn nested_renderings_collapse_into_the_outer_message() {
    let err = Fault::wrap(StoreError::Query(io::Error::other("connection reset")));

    let chain = flatten_with(&err, placeholder());
    let messages: Vec<&str> = chain.iter().map(Step::message).collect();
    assert_eq!(messages, ["query failed: connection reset"]);
    assert_eq!(chain.steps()[0].location(), Some(err.location()));

    let trimmed = FlattenOptions::new().nested_messages(NestedMessages::Trim);
    let chain = flatten_with(&err, trimmed);
    let messages: Vec<&str> = chain.iter().map(Step::message).collect();
    assert_eq!(messages, ["connection reset", "query failed"]);
}

#[test]
fn faults_inside_third_party_errors_keep_their_locations() {
    let (root, root_at) = (Fault::new("timeout"), Location::caller());
    let service = ServiceError { source: root };
    let err = faultline::wrap(
        StoreError::Lookup(Fault::wrap(service)),
        [tag::with(Tag::UNAVAILABLE)],
    );

    let chain = flatten_with(&err, merge());
    let messages: Vec<&str> = chain.iter().map(Step::message).collect();
    assert_eq!(messages, ["timeout", "service call failed", "lookup failed"]);
    assert_eq!(
        chain.steps()[0].location().map(|location| location.line()),
        Some(root_at.line())
    );
    assert!(chain.steps()[1].location().is_some());
    assert_eq!(chain.steps()[2].location(), Some(err.location()));
    assert_eq!(tag::get(&err), Some(&Tag::UNAVAILABLE));
}

#[test]
fn anyhow_chains_are_opaque_links() {
    let source =
        anyhow::Error::new(io::Error::other("disk full")).context("failed to write cache");
    let err = faultline::wrap(source, [msg::with("failed to persist session")]);

    let messages: Vec<String> = flatten_with(&err, placeholder())
        .iter()
        .map(|step| step.message().to_owned())
        .collect();
    assert_eq!(
        messages,
        ["disk full", "failed to write cache", "failed to persist session"]
    );
    assert!(root_cause(&err).is::<io::Error>());
}

#[test]
fn absent_errors_stay_absent() {
    let none: Option<io::Error> = None;
    assert!(none.wrap_with([msg::with("unused")]).is_none());

    let chain = faultline::Chain::from(None::<&(dyn Error + 'static)>);
    assert!(chain.is_empty());
    assert!(chain.root().is_none());
}

#[test]
fn metadata_from_every_layer_is_merged() {
    let ctx = faultline::context::Context::new().with_meta(&["user_id", "42"]);
    let err = faultline::wrap(NotFound, [faultline::context::with(&ctx, &[])]);
    let err = faultline::wrap(err, [values::pairs(&["attempt", "2"])]);

    let merged = values::get(&err);
    assert_eq!(merged["user_id"], "42");
    assert_eq!(merged["attempt"], "2");
    assert_eq!(merged.keys().collect::<Vec<_>>(), ["attempt", "user_id"]);
}

#[test]
fn annotation_ending_with_root_text_keeps_the_root() {
    let err = Err::<(), _>(io::Error::other("timeout"))
        .wrap()
        .wrap_with([msg::with("upstream call failed: timeout")])
        .unwrap_err();

    let messages: Vec<String> = flatten_with(&err, placeholder())
        .iter()
        .map(|step| step.message().to_owned())
        .collect();
    assert_eq!(messages, ["timeout", "upstream call failed: timeout"]);
    assert!(root_cause(&err).is::<io::Error>());
}
