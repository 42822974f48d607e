use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::create_book,
        api::books::get_book,
        api::books::update_book,
        api::circulation::issue_book,
        api::circulation::return_book,
        api::circulation::return_book_by_id,
        api::circulation::calculate_fine,
        api::circulation::update_fine,
        api::circulation::list_transactions,
        api::circulation::get_transaction,
        api::circulation::student_transactions,
    ),
    components(
        schemas(
            api::books::CreateBookRequest,
            api::books::UpdateBookRequest,
            api::circulation::IssueBookRequest,
            api::circulation::ReturnBookRequest,
            api::circulation::UpdateFineRequest,
        )
    ),
    tags(
        (name = "school-library", description = "School library circulation API")
    )
)]
pub struct ApiDoc;
