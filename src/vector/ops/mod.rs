mod conversions;
mod predicates;
