mod workbook_append;
