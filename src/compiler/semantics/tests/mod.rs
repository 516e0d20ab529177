mod type_checker;
