use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tern::conditions::{ConditionOutcome, Conditions, Tag};
use tern::conneg::{RepresentationInfo, Variant};
use tern::{Method, MimeType};

fn current(tag: Tag) -> RepresentationInfo {
  RepresentationInfo::new(Variant::new(MimeType::ApplicationJson)).with_tag(tag)
}

fn epoch_plus(secs: u64) -> SystemTime {
  UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
pub fn if_none_match_hit_depends_on_the_method() {
  let info = current(Tag::new("abc123"));
  let conditions = Conditions::none().with_none_match(Tag::new("abc123"));

  assert_eq!(conditions.status(&Method::Get, Some(&info)), ConditionOutcome::NotModified);
  assert_eq!(conditions.status(&Method::Head, Some(&info)), ConditionOutcome::NotModified);
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::PreconditionFailed);
  assert_eq!(conditions.status(&Method::Post, Some(&info)), ConditionOutcome::PreconditionFailed);
}

#[test]
pub fn if_none_match_miss_proceeds() {
  let info = current(Tag::new("abc123"));
  let conditions = Conditions::none().with_none_match(Tag::new("something-else"));

  assert_eq!(conditions.status(&Method::Get, Some(&info)), ConditionOutcome::Proceed);
}

#[test]
pub fn if_none_match_compares_weakly() {
  let info = current(Tag::new("v1"));
  let conditions = Conditions::none().with_none_match(Tag::weak("v1"));

  assert_eq!(conditions.status(&Method::Get, Some(&info)), ConditionOutcome::NotModified);
}

#[test]
pub fn if_match_requires_a_strong_match() {
  let info = current(Tag::new("v1"));

  let conditions = Conditions::none().with_match(Tag::new("v1"));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::Proceed);

  // A weak tag never strong-matches anything.
  let conditions = Conditions::none().with_match(Tag::weak("v1"));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::PreconditionFailed);

  let conditions = Conditions::none().with_match(Tag::new("v2"));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::PreconditionFailed);
}

#[test]
pub fn wildcard_if_match_on_an_absent_resource_fails() {
  let conditions = Conditions::none().with_match(Tag::all());

  assert_eq!(conditions.status(&Method::Put, None), ConditionOutcome::PreconditionFailed);

  let info = current(Tag::new("anything"));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::Proceed);
}

#[test]
pub fn if_match_wins_over_the_date_validators() {
  // If-Match misses while If-Modified-Since would answer 304. The tag
  // check runs first, so the outcome is 412.
  let info = current(Tag::new("v2")).with_modified(epoch_plus(1000));
  let conditions = Conditions::none()
    .with_match(Tag::new("v1"))
    .with_modified_since(epoch_plus(2000));

  assert_eq!(conditions.status(&Method::Get, Some(&info)), ConditionOutcome::PreconditionFailed);
}

#[test]
pub fn if_unmodified_since_fails_on_later_changes() {
  let info = RepresentationInfo::new(Variant::new(MimeType::TextPlain))
    .with_modified(epoch_plus(5000));

  let conditions = Conditions::none().with_unmodified_since(epoch_plus(4000));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::PreconditionFailed);

  let conditions = Conditions::none().with_unmodified_since(epoch_plus(5000));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::Proceed);

  let conditions = Conditions::none().with_unmodified_since(epoch_plus(6000));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::Proceed);
}

#[test]
pub fn if_modified_since_answers_not_modified_for_stale_dates() {
  let info = RepresentationInfo::new(Variant::new(MimeType::TextPlain))
    .with_modified(epoch_plus(5000));

  let conditions = Conditions::none().with_modified_since(epoch_plus(5000));
  assert_eq!(conditions.status(&Method::Get, Some(&info)), ConditionOutcome::NotModified);

  let conditions = Conditions::none().with_modified_since(epoch_plus(4000));
  assert_eq!(conditions.status(&Method::Get, Some(&info)), ConditionOutcome::Proceed);
}

#[test]
pub fn date_comparison_ignores_sub_second_precision() {
  // Http dates carry whole seconds only, a 500ms difference is no change.
  let info = RepresentationInfo::new(Variant::new(MimeType::TextPlain))
    .with_modified(epoch_plus(5000) + Duration::from_millis(500));

  let conditions = Conditions::none().with_modified_since(epoch_plus(5000));
  assert_eq!(conditions.status(&Method::Get, Some(&info)), ConditionOutcome::NotModified);

  let conditions = Conditions::none().with_unmodified_since(epoch_plus(5000));
  assert_eq!(conditions.status(&Method::Put, Some(&info)), ConditionOutcome::Proceed);
}

#[test]
pub fn no_conditions_always_proceed() {
  let conditions = Conditions::none();
  assert!(!conditions.has_some());
  assert_eq!(conditions.status(&Method::Get, None), ConditionOutcome::Proceed);

  let info = current(Tag::new("v1"));
  assert_eq!(conditions.status(&Method::Delete, Some(&info)), ConditionOutcome::Proceed);
}
