use async_trait::async_trait;
use django_core_auth::User;
use django_core_common::CoreResult;
use django_core_db::mixins::{AbstractBaseModel, AuditFields};
use django_core_db::model::unknown_field;
use django_core_db::{FromValue, InMemoryStore, Model, ModelStore, SavePrep, Value};
use django_core_forms::{
    AddFormAuditMixin, BaseForm, CharFieldStripped, DeleteFormMixin, EditFormAuditMixin, Form,
    PagingFormMixin, QueryFormMixin, UserAuthorizationRequiredForm, UserFormMixin,
};
use django_core_http::QueryDict;

#[derive(Debug, Clone, Default)]
struct Note {
    id: Option<i64>,
    body: String,
    audit: AuditFields,
}

impl Model for Note {
    fn table_name() -> &'static str {
        "notes_note"
    }
    fn app_label() -> &'static str {
        "notes"
    }
    fn model_name() -> &'static str {
        "note"
    }
    fn field_names() -> &'static [&'static str] {
        &[
            "id",
            "body",
            "created_user_id",
            "created_dttm",
            "last_modified_user_id",
            "last_modified_dttm",
        ]
    }
    fn pk(&self) -> Option<i64> {
        self.id
    }
    fn set_pk(&mut self, pk: Option<i64>) {
        self.id = pk;
    }
    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(self.id.into()),
            "body" => Some(self.body.clone().into()),
            other => self.audit.field_value(other),
        }
    }
    fn set_field_value(&mut self, name: &str, value: Value) -> CoreResult<()> {
        match name {
            "id" => self.id = FromValue::from_value(value)?,
            "body" => self.body = FromValue::from_value(value)?,
            other => {
                if !self.audit.set_field_value(other, value)? {
                    return Err(unknown_field::<Self>(other));
                }
            }
        }
        Ok(())
    }
}

impl AbstractBaseModel for Note {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }
    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

#[async_trait]
impl SavePrep for Note {
    async fn save_prep<S>(_store: &S, instances: &mut [Self]) -> CoreResult<()>
    where
        S: ModelStore<Self> + ?Sized,
    {
        Self::audit_save_prep(instances)
    }
}

fn user(id: i64) -> User {
    User {
        id: Some(id),
        ..User::new("ann", "ann@example.com")
    }
}

// ── DeleteFormMixin ─────────────────────────────────────────────────

fn note_form() -> DeleteFormMixin<BaseForm> {
    DeleteFormMixin::new(BaseForm::new(vec![CharFieldStripped::new("body")]))
}

#[tokio::test]
async fn test_delete_flag_skips_validation() {
    let mut form = note_form();
    form.bind(&QueryDict::parse("delete=true"));
    assert!(form.is_valid().await);
    assert!(form.errors().is_empty());
    assert!(form.delete_requested());

    let store = InMemoryStore::<Note>::new();
    assert!(form.save(&store, Note::default()).await.unwrap().is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_without_delete_flag_validates_and_saves() {
    let mut form = note_form();
    form.bind(&QueryDict::parse("delete=False"));
    assert!(!form.is_valid().await);
    assert!(form.errors().contains_key("body"));

    form.bind(&QueryDict::parse("body=hello"));
    assert!(form.is_valid().await);
    assert!(!form.delete_requested());

    let store = InMemoryStore::<Note>::new();
    let note = Note {
        body: "hello".into(),
        ..Note::default()
    };
    let saved = form.save(&store, note).await.unwrap().unwrap();
    assert!(saved.id.is_some());
    assert!(form.delete(&store, &saved).await.unwrap());
    assert!(store.is_empty().await);
}

#[test]
fn test_delete_field_is_hidden() {
    let form = note_form();
    let html = form.base().render_field("delete").unwrap();
    assert!(html.starts_with(r#"<input type="hidden" name="delete" value="false""#));
}

// ── Paging and query ────────────────────────────────────────────────

#[tokio::test]
async fn test_paging_and_query_fields() {
    let mut fields = PagingFormMixin::fields();
    fields.extend(QueryFormMixin::fields());
    let mut form = BaseForm::new(fields);

    assert_eq!(form.initial_value("p"), Some(&Value::Int(1)));
    assert_eq!(form.initial_value("ps"), Some(&Value::Int(25)));
    assert_eq!(form.field("ps").unwrap().label, "Page Size");

    form.bind(&QueryDict::parse("p=3&q=+hello+"));
    assert!(form.is_valid().await);
    assert_eq!(PagingFormMixin::page_num(&form), Some(3));
    assert_eq!(PagingFormMixin::page_size(&form), None);
    assert_eq!(QueryFormMixin::query(&form), Some("hello"));

    form.bind(&QueryDict::parse("q=+"));
    assert!(form.is_valid().await);
    assert_eq!(QueryFormMixin::query(&form), None);
}

// ── UserAuthorizationRequiredForm ───────────────────────────────────

#[tokio::test]
async fn test_user_authorization_required_form() {
    let mut ann = user(1);
    ann.set_password("right-password").await.unwrap();

    let mut form =
        UserAuthorizationRequiredForm::with_fields(ann, vec![CharFieldStripped::new("email")]);
    assert_eq!(form.user().username, "ann");

    form.bind(&QueryDict::parse("password=wrong&email=new@example.com"));
    assert!(!form.is_valid().await);
    assert_eq!(
        form.errors()["password"],
        vec!["Your old password was entered incorrectly. Please enter it again.".to_string()]
    );
    assert!(!form.cleaned_data().contains_key("password"));

    form.bind(&QueryDict::parse("password=right-password&email=new@example.com"));
    assert!(form.is_valid().await);
}

#[tokio::test]
async fn test_password_is_required_and_bounded() {
    let mut form = UserAuthorizationRequiredForm::new(user(1));
    form.bind(&QueryDict::new());
    assert!(!form.is_valid().await);
    assert_eq!(form.errors()["password"], vec!["This field is required.".to_string()]);

    let long = "x".repeat(51);
    form.bind(&QueryDict::from_pairs(&[("password", long.as_str())]));
    assert!(!form.is_valid().await);
}

// ── Audit ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_and_edit_audit() {
    let store = InMemoryStore::<Note>::new();
    let mut note = Note::default();

    AddFormAuditMixin::new(user(7))
        .save(&store, &mut note)
        .await
        .unwrap();
    assert_eq!(note.audit.created_user_id, Some(7));
    assert_eq!(note.audit.last_modified_user_id, Some(7));

    let editor = EditFormAuditMixin::new(user(8));
    assert_eq!(editor.user().id, Some(8));
    editor.save(&store, &mut note).await.unwrap();
    assert_eq!(note.audit.created_user_id, Some(7));
    assert_eq!(note.audit.last_modified_user_id, Some(8));

    let stored = store.all().await.unwrap();
    assert_eq!(stored[0].audit.last_modified_user_id, Some(8));
}
