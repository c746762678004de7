//! Access checks wrapped around views.
//!
//! Each wrapper checks the request user before handing the request to the
//! wrapped view. Anonymous users are redirected to the login page; logged in
//! users without the required flag get a 403.

use async_trait::async_trait;
use django_core_common::error::CoreError;
use django_core_common::utils::urls::build_url;
use django_core_db::mixins::AbstractBaseModel;
use django_core_http::{redirect, HttpRequest, HttpResponse};

use crate::mixins::common::{load_object, ObjectView};
use crate::view::View;

/// Where anonymous users are sent unless a wrapper is told otherwise.
pub const DEFAULT_LOGIN_URL: &str = "/accounts/login/";

fn login_redirect(login_url: &str, request: &HttpRequest) -> HttpResponse {
    let next = request.get_full_path();
    tracing::debug!(next = %next, "login required");
    redirect(&build_url(login_url, &[("next", next.as_str())]))
}

macro_rules! forward_view_config {
    () => {
        fn allowed_methods(&self) -> Vec<http::Method> {
            self.view.allowed_methods()
        }

        fn csrf_exempt(&self) -> bool {
            self.view.csrf_exempt()
        }
    };
}

/// Requires a logged in user.
///
/// ```
/// # tokio_test::block_on(async {
/// use async_trait::async_trait;
/// use django_core_http::{HttpRequest, HttpResponse, RequestUser};
/// use django_core_views::mixins::LoginRequired;
/// use django_core_views::View;
///
/// struct Profile;
///
/// #[async_trait]
/// impl View for Profile {
///     async fn get(&self, _request: HttpRequest) -> HttpResponse {
///         HttpResponse::ok("profile")
///     }
/// }
///
/// let view = LoginRequired::new(Profile);
/// let anonymous = HttpRequest::builder().path("/me/").build();
/// assert_eq!(
///     view.dispatch(anonymous).await.header("location"),
///     Some("/accounts/login/?next=%2Fme%2F")
/// );
///
/// let ann = HttpRequest::builder().user(RequestUser::authenticated(1, "ann")).build();
/// assert_eq!(view.dispatch(ann).await.text(), "profile");
/// # });
/// ```
pub struct LoginRequired<V> {
    view: V,
    login_url: String,
}

impl<V: View> LoginRequired<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }

    #[must_use]
    pub fn login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }
}

#[async_trait]
impl<V: View> View for LoginRequired<V> {
    forward_view_config!();

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        if !request.user().is_authenticated() {
            return login_redirect(&self.login_url, &request);
        }
        self.view.dispatch(request).await
    }
}

/// Requires a logged in staff member.
pub struct StaffRequired<V> {
    view: V,
    login_url: String,
}

impl<V: View> StaffRequired<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }

    #[must_use]
    pub fn login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }
}

#[async_trait]
impl<V: View> View for StaffRequired<V> {
    forward_view_config!();

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let user = request.user();
        if !user.is_authenticated() {
            return login_redirect(&self.login_url, &request);
        }
        if !user.is_staff {
            return CoreError::PermissionDenied("Staff access required".into()).into();
        }
        self.view.dispatch(request).await
    }
}

/// Requires a logged in superuser.
pub struct SuperuserRequired<V> {
    view: V,
    login_url: String,
}

impl<V: View> SuperuserRequired<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }

    #[must_use]
    pub fn login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }
}

#[async_trait]
impl<V: View> View for SuperuserRequired<V> {
    forward_view_config!();

    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let user = request.user();
        if !user.is_authenticated() {
            return login_redirect(&self.login_url, &request);
        }
        if !user.is_superuser {
            return CoreError::PermissionDenied("Superuser access required".into()).into();
        }
        self.view.dispatch(request).await
    }
}

/// Requires the request user to be the creator of the view's object.
///
/// 404 when the object doesn't exist, 403 when someone else created it. The
/// object loaded for the check is the one handed to the view.
pub struct CreatorRequired<V> {
    view: V,
}

impl<V> CreatorRequired<V>
where
    V: ObjectView,
    V::Object: AbstractBaseModel,
{
    pub const fn new(view: V) -> Self {
        Self { view }
    }
}

#[async_trait]
impl<V> View for CreatorRequired<V>
where
    V: ObjectView,
    V::Object: AbstractBaseModel,
{
    async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let object = match load_object(&self.view, &request).await {
            Ok(object) => object,
            Err(e) => return e.into(),
        };
        let creator = object.audit().created_user_id;
        if creator.is_none() || creator != request.user().id {
            tracing::debug!(?creator, user_id = ?request.user().id, "not the creator");
            return CoreError::PermissionDenied("Only the creator may access this".into()).into();
        }
        self.view.dispatch_object(request, object).await
    }
}
