use http::{Method, Response};
use micro_route::dsl::{compile_from_content, CompilerOptions};
use micro_route_web::{resolver_fn, Dispatcher, ResponseBody, RouteRequest};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const ROUTES: &str = r"
<route>
path: /
entry: home
</route>
<route>
path: /hello/$
method: GET
name: hello
entry: greet
</route>
";

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let table = compile_from_content(ROUTES, &CompilerOptions::default()).expect("routes should compile");

    let dispatcher = Dispatcher::builder()
        .table(table)
        .resolver(resolver_fn(|entry, matched| {
            let body = match entry {
                "greet" => format!("hello {}\r\n", matched.segment(0).unwrap_or("stranger")),
                "404" => String::from("404 not found\r\n"),
                other => format!("entry {other}\r\n"),
            };
            Ok(Response::new(ResponseBody::from(body)))
        }))
        .build()
        .unwrap();

    for (method, uri) in [(Method::GET, "/"), (Method::GET, "/hello/world"), (Method::POST, "/hello/world"), (Method::GET, "/nope")] {
        let request = RouteRequest::new(method.clone(), uri).unwrap();
        let response = dispatcher.render(&request).unwrap();
        let status = response.status();
        let body = response.into_body().into_bytes().unwrap();
        print!("{method} {uri} -> {status}: {}", String::from_utf8_lossy(&body));
    }

    println!("reverse: {}", dispatcher.route("hello", &["rust lang".into()]).unwrap());
}
