//! The contract between a server and the code it serves.
//!
//! An [`Application`] receives one [`Environment`] per request and answers
//! with a [`Response`]. It may fail; every error carries its own HTTP status
//! through [`HttpError`], and [`invoke`] is how a server turns such a failure
//! into a response while reporting it through the request's diagnostic sink.
//!
//! # Examples
//!
//! ```rust
//! use http_app_kit::{Application, BoxHttpError, Environment, Response, StatusCode};
//!
//! struct Hello;
//!
//! impl Application for Hello {
//!     type Error = BoxHttpError;
//!     async fn handle(&mut self, env: Environment) -> Result<Response, Self::Error> {
//!         let greeting = format!("Hello from {}", env.path_info());
//!         Ok(Response::new(StatusCode::OK, greeting))
//!     }
//! }
//! ```
//!
//! Closures work too:
//!
//! ```rust
//! use http_app_kit::{application, BoxHttpError, Environment, Response, StatusCode};
//!
//! let app = application::from_fn(|env: Environment| async move {
//!     Ok::<_, BoxHttpError>(Response::from_status(match env.path_info() {
//!         "/" => StatusCode::OK,
//!         _ => StatusCode::NOT_FOUND,
//!     }))
//! });
//! # drop(app);
//! ```
use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use core::any::type_name;
use core::fmt;
use core::future::Future;
use core::ops::DerefMut;
use core::pin::Pin;

use crate::error::BoxHttpError;
use crate::{Environment, HttpError, Response};

/// A request handler.
///
/// `handle` consumes the environment: the application owns the request body
/// and decides whether and how far to read it. Side effects are allowed.
pub trait Application: Send {
    /// The failure type; its [`status`](HttpError::status) becomes the
    /// response status when the server goes through [`invoke`].
    type Error: HttpError;

    /// Handles one request.
    fn handle(
        &mut self,
        environment: Environment,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;
}

impl<A: Application> Application for &mut A {
    type Error = A::Error;
    async fn handle(&mut self, environment: Environment) -> Result<Response, Self::Error> {
        Application::handle(*self, environment).await
    }
}

impl<A: Application> Application for Box<A> {
    type Error = A::Error;
    async fn handle(&mut self, environment: Environment) -> Result<Response, Self::Error> {
        Application::handle(self.deref_mut(), environment).await
    }
}

/// Runs `application` the way a server should.
///
/// A successful response is returned as is. On failure the error text goes
/// to the environment's diagnostic sink and the result is a response with
/// the error's status, its canonical reason phrase and no body.
///
/// ```rust
/// # #[cfg(feature = "std")]
/// # {
/// use std::sync::Arc;
/// use http_app_kit::{application, bail, BoxHttpError, Environment, Method, Response, StatusCode};
/// use http_app_kit::diagnostic::MemorySink;
///
/// # async fn example() {
/// let mut app = application::from_fn(|env: Environment| async move {
///     if env.header(&http_app_kit::header::AUTHORIZATION).is_none() {
///         bail!(403, "no access");
///     }
///     Ok::<_, BoxHttpError>(Response::empty())
/// });
///
/// let sink = Arc::new(MemorySink::new());
/// let env = Environment::builder(Method::Get)
///     .diagnostics(Arc::clone(&sink))
///     .build();
/// let response = application::invoke(&mut app, env).await;
///
/// assert_eq!(response.status(), StatusCode::FORBIDDEN);
/// assert_eq!(sink.messages(), ["no access"]);
/// # }
/// # }
/// ```
pub async fn invoke<A: Application>(application: &mut A, environment: Environment) -> Response {
    let diagnostics = Arc::clone(environment.diagnostics());
    match application.handle(environment).await {
        Ok(response) => response,
        Err(error) => {
            let status = error.status();
            let message = format!("{error}");
            tracing::warn!(%status, error = %message, "application failed");
            diagnostics.log_error(&message);
            Response::from_status(status)
        }
    }
}

/// Creates an application from a closure returning a future.
pub fn from_fn<F, Fut, E>(f: F) -> FnApplication<F>
where
    F: FnMut(Environment) -> Fut + Send,
    Fut: Future<Output = Result<Response, E>> + Send,
    E: HttpError,
{
    FnApplication(f)
}

/// An application built by [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnApplication<F>(F);

impl<F> fmt::Debug for FnApplication<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnApplication[{}]", type_name::<F>())
    }
}

impl<F, Fut, E> Application for FnApplication<F>
where
    F: FnMut(Environment) -> Fut + Send,
    Fut: Future<Output = Result<Response, E>> + Send,
    E: HttpError,
{
    type Error = E;
    async fn handle(&mut self, environment: Environment) -> Result<Response, Self::Error> {
        (self.0)(environment).await
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

trait ApplicationImpl: Send {
    fn handle_boxed(
        &mut self,
        environment: Environment,
    ) -> BoxFuture<'_, Result<Response, BoxHttpError>>;

    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

impl<A: Application> ApplicationImpl for A {
    fn handle_boxed(
        &mut self,
        environment: Environment,
    ) -> BoxFuture<'_, Result<Response, BoxHttpError>> {
        Box::pin(async move {
            Application::handle(self, environment)
                .await
                .map_err(BoxHttpError::new)
        })
    }
}

/// A type-erased application.
///
/// Servers hosting applications of different types keep them behind this
/// one type. Errors come out as [`BoxHttpError`], keeping their status.
pub struct AnyApplication(Box<dyn ApplicationImpl>);

impl fmt::Debug for AnyApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyApplication[{}]", self.name())
    }
}

impl AnyApplication {
    /// Erases the type of `application`.
    pub fn new(application: impl Application + 'static) -> Self {
        Self(Box::new(application))
    }

    /// The type name of the wrapped application.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Application for AnyApplication {
    type Error = BoxHttpError;
    async fn handle(&mut self, environment: Environment) -> Result<Response, Self::Error> {
        self.0.handle_boxed(environment).await
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::diagnostic::{MemorySink, NullSink};
    use crate::enumerator::Step;
    use crate::{Enumerator, Error, Method, StatusCode};
    use alloc::string::String;
    use alloc::vec::Vec;

    fn failure(message: &'static str, status: StatusCode) -> BoxHttpError {
        Error::msg(message).set_status(status).into()
    }

    struct Echo;

    impl Application for Echo {
        type Error = crate::BodyError;
        async fn handle(&mut self, env: Environment) -> Result<Response, Self::Error> {
            let body = env
                .into_input()
                .run(
                    |mut acc: Vec<u8>, chunk| {
                        acc.extend_from_slice(&chunk);
                        Step::Continue(acc)
                    },
                    Vec::new(),
                )
                .await?;
            Ok(Response::new(StatusCode::OK, body))
        }
    }

    fn env(body: impl Into<Enumerator>, sink: Arc<MemorySink>) -> Environment {
        Environment::builder(Method::Post)
            .input(body)
            .diagnostics(sink)
            .build()
    }

    #[tokio::test]
    async fn invoke_passes_successful_responses_through() {
        let sink = Arc::new(MemorySink::new());
        let response = invoke(&mut Echo, env("ping", sink.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().size_hint(), (4, Some(4)));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn invoke_turns_errors_into_status_responses() {
        let sink = Arc::new(MemorySink::new());
        let mut app = from_fn(|_env: Environment| async move {
            Err::<Response, _>(failure("database unavailable", StatusCode::SERVICE_UNAVAILABLE))
        });
        let response = invoke(&mut app, env("", sink.clone())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.reason(), "Service Unavailable");
        assert!(response.body().is_finished());
        assert_eq!(sink.messages(), ["database unavailable"]);
    }

    #[tokio::test]
    async fn consumed_input_surfaces_as_server_error() {
        let mut app = from_fn(|mut env: Environment| async move {
            drop(env.take_input());
            let mut echo = Echo;
            echo.handle(env).await
        });
        let sink = Arc::new(MemorySink::new());
        let response = invoke(&mut app, env("data", sink.clone())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sink.messages().len(), 1);
    }

    #[tokio::test]
    async fn erased_applications_keep_error_status() {
        let mut apps = [
            AnyApplication::new(Echo),
            AnyApplication::new(from_fn(|_env: Environment| async move {
                Err::<Response, _>(failure("nope", StatusCode::GONE))
            })),
        ];
        let mut statuses = Vec::new();
        for app in &mut apps {
            let env = Environment::builder(Method::Get).diagnostics(NullSink).build();
            statuses.push(match app.handle(env).await {
                Ok(response) => response.status(),
                Err(error) => error.status(),
            });
        }
        assert_eq!(statuses, [StatusCode::OK, StatusCode::GONE]);
        assert!(apps[0].name().ends_with("Echo"));
    }

    #[tokio::test]
    async fn state_survives_between_requests() {
        let mut seen = Vec::new();
        {
            let mut app = from_fn(|env: Environment| {
                seen.push(String::from(env.path_info()));
                async move { Ok::<_, BoxHttpError>(Response::empty()) }
            });
            for path in ["/a", "/b"] {
                let env = Environment::builder(Method::Get)
                    .path_info(path)
                    .diagnostics(NullSink)
                    .build();
                app.handle(env).await.unwrap();
            }
        }
        assert_eq!(seen, ["/a", "/b"]);
    }
}
