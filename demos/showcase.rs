//! Prints a few sample records through each formatter with
//! highlighting enabled. Run with `cargo run --example showcase`.

use klogger::{tags, FormatterKind, Logger};

fn print_examples(logger: &Logger) {
    logger.info(("Hello world!", tags! { name: "Adam" }));
    logger.debug(("Debug message", tags! { age: 30, ip_address: 1.234 }));
    logger.error(("This should not happen", tags! { number: 4 }));
    logger.warn("Something bad will happen soon if you are not careful");

    let error = "not a number".parse::<i32>().unwrap_err();
    logger.exception(&error, None, tags! {});
}

fn main() {
    let formatters = [
        ("JSON output", FormatterKind::Json),
        ("Simple output", FormatterKind::Simple),
        ("Go-style output", FormatterKind::Go),
    ];

    for (title, formatter) in formatters {
        println!("\n{title}\n");
        let logger = Logger::builder()
            .name("example")
            .formatter(formatter)
            .highlight(true)
            .build();
        print_examples(&logger);
    }
}
