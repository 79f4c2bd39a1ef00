//! ActixWeb Middleware to switch user before requests are handled.
use std::fmt::Display;
use std::fmt::Formatter;
use std::future::Ready;
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::forward_ready;
use actix_web::dev::Service;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::dev::Transform;
use actix_web::http::header::LOCATION;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpMessage;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use futures_util::future::LocalBoxFuture;

use switchuser_auth::access::AccessDenied;
use switchuser_auth::validator::AccountStatusError;
use switchuser_context::Context;
use switchuser_context::SecurityContext;

use crate::errors::CredentialsNotFound;
use crate::Outcome;
use crate::SwitchUserInterceptor;

/// Switch user for requests carrying the trigger parameter, then forward them.
pub struct SwitchUserService<S> {
    interceptor: SwitchUserInterceptor,
    root: Context,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SwitchUserService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut request: ServiceRequest) -> Self::Future {
        // Derive the operation context for the security scope attached to the request.
        let root = request
            .app_data::<Data<Context>>()
            .map(|root| root.get_ref().clone())
            .unwrap_or_else(|| self.root.clone());
        let security = request
            .extensions()
            .get::<SecurityContext>()
            .cloned()
            .unwrap_or_default();
        let context = root.derive().log_trace().security(security).build();

        let response = match self.interceptor.handle(&context, &mut request) {
            Err(error) => {
                slog::debug!(context.logger, "Switch user request failed"; "error" => %error);
                SwitchUserError(error).error_response()
            }
            Ok(Outcome::Redirect(url)) => HttpResponse::Found()
                .insert_header((LOCATION, url))
                .finish(),
            Ok(Outcome::Proceed | Outcome::Skip) => {
                request.extensions_mut().insert(context);
                let service = self.service.call(request);
                return Box::pin(async move {
                    let response = service.await?;
                    Ok(response.map_into_left_body())
                });
            }
        };

        // Respond directly when the request was not forwarded.
        let response = request.into_response(response.map_into_right_body());
        Box::pin(async move { Ok(response) })
    }
}

/// Wrap an [`App`](actix_web::App) with a middleware that switches user on request.
///
/// The [`SecurityContext`] of each request is looked up in the request extensions,
/// where session management middlewares are expected to attach it.
/// Requests with no [`SecurityContext`] are handled with an empty one.
#[derive(Clone)]
pub struct SwitchUserMiddleware {
    interceptor: SwitchUserInterceptor,
    root: Context,
}

impl SwitchUserMiddleware {
    /// Initialise a [`SwitchUserMiddleware`] with a root [`Context`] to use as a fallback.
    pub fn new(root: Context, interceptor: SwitchUserInterceptor) -> Self {
        Self { interceptor, root }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SwitchUserMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SwitchUserService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let middleware = SwitchUserService {
            interceptor: self.interceptor.clone(),
            root: self.root.clone(),
            service: Rc::new(service),
        };
        std::future::ready(Ok(middleware))
    }
}

/// Map switch user errors onto HTTP responses.
#[derive(Debug)]
pub struct SwitchUserError(pub anyhow::Error);

impl Display for SwitchUserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for SwitchUserError {
    fn status_code(&self) -> StatusCode {
        if self.0.is::<CredentialsNotFound>() {
            StatusCode::UNAUTHORIZED
        } else if self.0.is::<AccessDenied>() || self.0.is::<AccountStatusError>() {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "unable to switch user".to_string()
        } else {
            self.0.to_string()
        };
        HttpResponse::build(status).body(message)
    }
}

#[cfg(test)]
mod tests {
    use actix_web::dev::Service;
    use actix_web::http::header::LOCATION;
    use actix_web::http::StatusCode;
    use actix_web::test::call_service;
    use actix_web::test::init_service;
    use actix_web::test::read_body;
    use actix_web::test::TestRequest;
    use actix_web::web;
    use actix_web::App;
    use actix_web::HttpMessage;
    use actix_web::HttpRequest;
    use actix_web::HttpResponse;

    use switchuser_auth_memory::AccountStatusChecker;
    use switchuser_auth_memory::CapabilityOracle;
    use switchuser_auth_memory::MemoryDirectory;
    use switchuser_context::Context;
    use switchuser_context::SecurityContext;
    use switchuser_models::Credential;
    use switchuser_models::DirectCredential;
    use switchuser_models::UserRecord;

    use super::SwitchUserMiddleware;
    use crate::SwitchUserConf;
    use crate::SwitchUserInterceptor;

    fn admin() -> Credential {
        let user = UserRecord::new("admin").with_capabilities(["ROLE_ALLOWED_TO_SWITCH"]);
        DirectCredential::new(user, "main")
            .with_capabilities(["ROLE_ALLOWED_TO_SWITCH"])
            .into()
    }

    fn middleware(conf: SwitchUserConf) -> SwitchUserMiddleware {
        let directory = MemoryDirectory::with_users([
            UserRecord::new("admin").with_capabilities(["ROLE_ALLOWED_TO_SWITCH"]),
            UserRecord::new("kuba").with_capabilities(["ROLE_USER"]),
        ]);
        let interceptor =
            SwitchUserInterceptor::builder(conf, directory, CapabilityOracle, AccountStatusChecker)
                .build()
                .unwrap();
        SwitchUserMiddleware::new(Context::fixture(), interceptor)
    }

    async fn echo(request: HttpRequest, context: Context) -> HttpResponse {
        let identifier = context
            .security
            .credential()
            .map(|credential| credential.identifier().to_string())
            .unwrap_or_default();
        HttpResponse::Ok().body(format!("{}|{}", identifier, request.query_string()))
    }

    macro_rules! app {
        ($conf:expr, $scope:expr) => {{
            let scope: SecurityContext = $scope;
            let app = App::new()
                .route("/", web::get().to(echo))
                .wrap(middleware($conf))
                .wrap_fn(move |request, service| {
                    request.extensions_mut().insert(scope.clone());
                    service.call(request)
                });
            init_service(app).await
        }};
    }

    #[actix_web::test]
    async fn forward_without_trigger() {
        let scope = SecurityContext::with_credential(admin());
        let app = app!(SwitchUserConf::new("main"), scope);
        let request = TestRequest::get().uri("/?page=3").to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        assert_eq!(body, "admin|page=3");
    }

    #[actix_web::test]
    async fn redirect_after_switch() {
        let scope = SecurityContext::with_credential(admin());
        let app = app!(SwitchUserConf::new("main"), scope.clone());
        let request = TestRequest::get()
            .uri("/?_switch_user=kuba&page=3&section=2")
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers().get(LOCATION).unwrap();
        assert_eq!(location, "/?page=3&section=2");

        let credential = scope.credential().unwrap();
        assert_eq!(credential.identifier(), "kuba");
        assert_eq!(credential.original(), Some(admin().anchor()));
    }

    #[actix_web::test]
    async fn stateless_forwards_stripped_request() {
        let mut conf = SwitchUserConf::new("main");
        conf.stateless = true;
        let scope = SecurityContext::with_credential(admin());
        let app = app!(conf, scope);
        let request = TestRequest::get()
            .uri("/?_switch_user=kuba&page=3")
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        assert_eq!(body, "kuba|page=3");
    }

    #[actix_web::test]
    async fn unknown_target_is_forbidden() {
        let scope = SecurityContext::with_credential(admin());
        let app = app!(SwitchUserConf::new("main"), scope);
        let request = TestRequest::get().uri("/?_switch_user=ghost").to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn exit_without_impersonation_is_unauthorized() {
        let scope = SecurityContext::with_credential(admin());
        let app = app!(SwitchUserConf::new("main"), scope);
        let request = TestRequest::get().uri("/?_switch_user=_exit").to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
