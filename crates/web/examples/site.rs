//! Compiles a small site from `.router` files on disk, with an include and static assets.

use http::header::ACCEPT;
use http::{HeaderValue, Method, Response, StatusCode};
use micro_route_web::{resolver_fn, Dispatcher, ResponseBody, RouteRequest, RouterSettings};
use std::fs;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let site = tempfile::tempdir()?;
    fs::create_dir_all(site.path().join("public/assets/css"))?;
    fs::write(site.path().join("public/assets/css/site.css"), "body { margin: 0 }")?;
    fs::write(
        site.path().join("routes.router"),
        "<assets>assets</assets>\n\n#route\npath: /\nentry: pages/home\n#endroute\n\n#include \"blog.router\"\n",
    )?;
    fs::write(
        site.path().join("blog.router"),
        "<route>\npath: /blog/$/$\nmethod: GET\nname: blog.post\nentry: pages/post\n</route>\n\
         <route>\npath: /blog\nmethod: POST\nentry: actions/publish\n</route>\n",
    )?;

    let settings = RouterSettings {
        source: site.path().join("routes.router"),
        compiled: site.path().join("routes.json"),
        document_root: site.path().join("public"),
        not_found_entry: String::from("pages/missing"),
    };

    let dispatcher = Dispatcher::builder()
        .table(settings.load_or_compile()?)
        .document_root(settings.document_root())
        .resolver(resolver_fn(|entry, matched| {
            let body = format!("[{entry}] segments={:?} query={}\r\n", matched.segments(), matched.query().as_map().len());
            let status = if entry == "pages/missing" { StatusCode::NOT_FOUND } else { StatusCode::OK };
            Ok(Response::builder().status(status).body(ResponseBody::from(body))?)
        }))
        .build()?;

    info!(compiled = %fs::read_to_string(&settings.compiled)?, "persisted table");

    let requests = [
        RouteRequest::new(Method::GET, "/")?,
        RouteRequest::new(Method::GET, "/blog/2024/hello-world?tags[]=rust&tags[]=http")?,
        RouteRequest::new(Method::GET, "/assets/css/site.css")?,
        RouteRequest::new(Method::GET, "/assets/../routes.json")?,
        RouteRequest::new(Method::GET, "/blog")?,
        RouteRequest::new(Method::GET, "/blog")?.with_header(ACCEPT, HeaderValue::from_static("application/json")),
    ];

    for request in &requests {
        let response = dispatcher.render(request)?;
        let status = response.status();
        let allow = response.headers().get(http::header::ALLOW).cloned();
        let body = response.into_body().into_bytes()?;
        println!("{} {} -> {status} {allow:?}\n  {}", request.method(), request.path_and_query(), String::from_utf8_lossy(&body).trim_end());
    }

    println!("{}", dispatcher.route("blog.post", &[2024u32.into(), "hello world".into()])?);
    Ok(())
}
