pub mod category_select;
pub mod question_area;
