use actix_web::{
    get, patch, post, put,
    web::{self, Bytes, Data, Json, Path, Query},
    HttpResponse,
};
use hostel_shared::{BookableFilter, NewRoom, RoomDetails, RoomInventory};
use validator::Validate;

use crate::{
    auth::Admin,
    error::ApiError,
    models::{CleaningReport, MaintenanceToggle, OccupancyChange},
};

type ApiResult = Result<HttpResponse, ApiError>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| ApiError::Malformed(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::Malformed(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            .service(list_rooms)
            // must come before the `{room_number}` routes
            .service(list_bookable)
            .service(get_room)
            .service(create_room)
            .service(update_room)
            .service(check_in)
            .service(check_out)
            .service(set_maintenance)
            .service(record_cleaning),
    );
}

#[get("/rooms")]
async fn list_rooms(_: Admin, inventory: Data<RoomInventory>) -> ApiResult {
    Ok(HttpResponse::Ok().json(inventory.list_rooms().await?))
}

#[get("/rooms/bookable")]
async fn list_bookable(filter: Query<BookableFilter>, inventory: Data<RoomInventory>) -> ApiResult {
    let rooms = inventory.list_bookable(filter.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rooms.iter().collect::<Vec<_>>()))
}

#[get("/rooms/{room_number}")]
async fn get_room(room_number: Path<String>, inventory: Data<RoomInventory>) -> ApiResult {
    Ok(HttpResponse::Ok().json(inventory.get_room(&room_number).await?))
}

#[post("/rooms")]
async fn create_room(_: Admin, spec: Json<NewRoom>, inventory: Data<RoomInventory>) -> ApiResult {
    let room = inventory.create_room(spec.into_inner()).await?;
    Ok(HttpResponse::Created().json(room))
}

#[patch("/rooms/{room_number}")]
async fn update_room(
    _: Admin,
    room_number: Path<String>,
    details: Json<RoomDetails>,
    inventory: Data<RoomInventory>,
) -> ApiResult {
    let room = inventory
        .update_details(&room_number, details.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(room))
}

#[post("/rooms/{room_number}/check-in")]
async fn check_in(
    _: Admin,
    room_number: Path<String>,
    change: Json<OccupancyChange>,
    inventory: Data<RoomInventory>,
) -> ApiResult {
    change.validate()?;
    let room = inventory.check_in(&room_number, change.count).await?;
    Ok(HttpResponse::Ok().json(room))
}

#[post("/rooms/{room_number}/check-out")]
async fn check_out(
    _: Admin,
    room_number: Path<String>,
    change: Json<OccupancyChange>,
    inventory: Data<RoomInventory>,
) -> ApiResult {
    change.validate()?;
    let room = inventory.check_out(&room_number, change.count).await?;
    Ok(HttpResponse::Ok().json(room))
}

#[put("/rooms/{room_number}/maintenance")]
async fn set_maintenance(
    _: Admin,
    room_number: Path<String>,
    toggle: Json<MaintenanceToggle>,
    inventory: Data<RoomInventory>,
) -> ApiResult {
    let room = inventory
        .set_maintenance(&room_number, toggle.enabled)
        .await?;
    Ok(HttpResponse::Ok().json(room))
}

#[post("/rooms/{room_number}/cleaning")]
async fn record_cleaning(
    _: Admin,
    room_number: Path<String>,
    body: Bytes,
    inventory: Data<RoomInventory>,
) -> ApiResult {
    let at = CleaningReport::from_body(&body)?
        .timestamp
        .unwrap_or_else(|| inventory.clock().now());
    let room = inventory.record_cleaning(&room_number, at).await?;
    Ok(HttpResponse::Ok().json(room))
}
