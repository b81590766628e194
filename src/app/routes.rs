//! Route tree of the sample application.
//!
//! ```text
//! api.sampleResource.list     GET  /api/sampleResource
//! api.sampleResource.create   POST /api/sampleResource
//! api.sampleResource.get      GET  /api/sampleResource/:publicId
//! api.sampleResource.delete   POST /api/sampleResource/:publicId/Delete
//! api.sampleResource.update   POST /api/sampleResource/:publicId/Update
//! pages.root                  GET  /
//! pages.default               GET  /*
//! ```

use crate::routes::{self, group, DefsError, RouteDefs};
use crate::schema::shape::{self, Shape};

fn resource() -> Shape {
    shape::object([
        ("publicId", shape::string()),
        ("name", shape::string()),
        ("age", shape::number().optional().nullable()),
    ])
}

fn resource_item() -> Shape {
    shape::object([("item", resource())])
}

fn public_id_params() -> (&'static str, Shape) {
    ("params", shape::object([("publicId", shape::string())]))
}

pub fn route_defs() -> Result<RouteDefs, DefsError> {
    let sample_resource = group(
        "/sampleResource",
        [
            (
                "list",
                routes::get("/").with_response(shape::object([("items", shape::array(resource()))])),
            ),
            (
                "create",
                routes::post("/")
                    .with_request(shape::object([(
                        "body",
                        shape::object([(
                            "item",
                            shape::object([("name", shape::string()), ("age", shape::number().optional())]),
                        )]),
                    )]))
                    .with_response(resource_item()),
            ),
            (
                "delete",
                routes::post("/:publicId/Delete")
                    .with_request(shape::object([public_id_params()]))
                    .with_response(shape::object::<_, &str>([])),
            ),
            (
                "get",
                routes::get("/:publicId")
                    .with_request(shape::object([public_id_params()]))
                    .with_response(resource_item()),
            ),
            (
                "update",
                routes::post("/:publicId/Update")
                    .with_request(shape::object([
                        public_id_params(),
                        (
                            "body",
                            shape::object([(
                                "item",
                                shape::object([
                                    ("name", shape::string().optional()),
                                    ("age", shape::number().optional()),
                                ]),
                            )]),
                        ),
                    ]))
                    .with_response(resource_item()),
            ),
        ],
    )?;

    let pages = group(
        "/",
        [
            ("root", routes::get("/")),
            (
                "default",
                routes::get("/*").with_request(shape::object([(
                    "params",
                    shape::object([("*", shape::string())]),
                )])),
            ),
        ],
    )?;

    routes::define([
        ("api", group("/api", [("sampleResource", sample_resource)])?),
        ("pages", pages),
    ])
}
